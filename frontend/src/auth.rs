//! 认证模块
//!
//! - `IdentityProvider`: 身份提供方抽象，生产实现为 Firebase Identity Toolkit REST
//! - `AuthSession`: 会话持久化 + 状态变化通知（挂载时通知一次，之后每次切换通知）
//! - `AuthContext`: 供组件使用的 Leptos 上下文
//!
//! 路由服务只消费 `Signal<AuthState>`，不直接依赖本模块的其他部分。

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use leptos::logging::{error, log};
use leptos::prelude::*;
use litreview_shared::STORAGE_AUTH_SESSION_KEY;
use litreview_shared::validation::{is_blank, is_valid_email};
use serde::{Deserialize, Serialize};

use crate::entitlement::PremiumStore;
use crate::web::{BrowserStorage, HttpClient, KeyValueStorage};

const IDENTITY_TOOLKIT_BASE: &str = "https://identitytoolkit.googleapis.com/v1/accounts";

// =========================================================
// 状态模型
// =========================================================

/// 已登录用户
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub email: String,
}

/// 认证状态
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    SignedOut,
    SignedIn(Identity),
}

impl AuthState {
    pub fn email(&self) -> Option<&str> {
        match self {
            AuthState::SignedIn(identity) => Some(identity.email.as_str()),
            AuthState::SignedOut => None,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, AuthState::SignedIn(_))
    }
}

/// 持久化的会话凭据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub uid: String,
    pub email: String,
    pub id_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

impl StoredSession {
    fn identity(&self) -> Identity {
        Identity {
            uid: self.uid.clone(),
            email: self.email.clone(),
        }
    }
}

/// 登录方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
}

// =========================================================
// 错误
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Please enter your email and password.")]
    MissingFields,
    #[error("The email address is badly formatted.")]
    InvalidEmail,
    #[error("The email address is already in use by another account.")]
    EmailExists,
    #[error("Password should be at least 6 characters.")]
    WeakPassword,
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("This account has been disabled.")]
    UserDisabled,
    #[error("Too many attempts. Please try again later.")]
    TooManyAttempts,
    #[error("Authentication is not configured.")]
    NotConfigured,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Authentication failed: {0}")]
    Provider(String),
}

impl AuthError {
    /// 将 Identity Toolkit 错误码映射为可读错误
    ///
    /// 错误码可能附带说明，如 `WEAK_PASSWORD : Password should be ...`
    pub fn from_provider_code(raw: &str) -> Self {
        let code = raw.split(" : ").next().unwrap_or(raw).trim();
        match code {
            "EMAIL_EXISTS" => Self::EmailExists,
            "INVALID_EMAIL" => Self::InvalidEmail,
            "WEAK_PASSWORD" => Self::WeakPassword,
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
                Self::InvalidCredentials
            }
            "USER_DISABLED" => Self::UserDisabled,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::TooManyAttempts,
            "MISSING_PASSWORD" | "MISSING_EMAIL" => Self::MissingFields,
            other => Self::Provider(other.to_string()),
        }
    }
}

// =========================================================
// 身份提供方
// =========================================================

#[async_trait(?Send)]
pub trait IdentityProvider {
    async fn authenticate(
        &self,
        mode: AuthMode,
        email: &str,
        password: &str,
    ) -> Result<StoredSession, AuthError>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    id_token: String,
    #[serde(default)]
    refresh_token: String,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    error: ProviderErrorDetail,
}

#[derive(Deserialize)]
struct ProviderErrorDetail {
    #[serde(default)]
    message: String,
}

/// 解析 Identity Toolkit 响应
pub fn parse_token_response(
    status: u16,
    body: &str,
    requested_email: &str,
) -> Result<StoredSession, AuthError> {
    if !(200..300).contains(&status) {
        return Err(serde_json::from_str::<ProviderErrorBody>(body)
            .map(|b| AuthError::from_provider_code(&b.error.message))
            .unwrap_or_else(|_| AuthError::Provider(format!("HTTP {}", status))));
    }

    let token: TokenResponse =
        serde_json::from_str(body).map_err(|e| AuthError::Provider(e.to_string()))?;
    let email = if token.email.is_empty() {
        requested_email.to_string()
    } else {
        token.email
    };

    Ok(StoredSession {
        uid: token.local_id,
        email,
        id_token: token.id_token,
        refresh_token: token.refresh_token,
    })
}

/// Firebase Identity Toolkit REST 实现
pub struct FirebaseIdentity {
    api_key: Option<String>,
}

impl FirebaseIdentity {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }
}

#[async_trait(?Send)]
impl IdentityProvider for FirebaseIdentity {
    async fn authenticate(
        &self,
        mode: AuthMode,
        email: &str,
        password: &str,
    ) -> Result<StoredSession, AuthError> {
        let api_key = self.api_key.as_deref().ok_or(AuthError::NotConfigured)?;
        let endpoint = match mode {
            AuthMode::SignIn => "signInWithPassword",
            AuthMode::SignUp => "signUp",
        };
        let url = format!("{}:{}?key={}", IDENTITY_TOOLKIT_BASE, endpoint, api_key);

        let payload = serde_json::json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });

        let resp = HttpClient::post(&url)
            .json(&payload)
            .map_err(|e| AuthError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        parse_token_response(status, &body, email)
    }
}

// =========================================================
// 会话
// =========================================================

type Listener = Rc<dyn Fn(&AuthState)>;

/// 会话存储与状态广播
pub struct AuthSession<S: KeyValueStorage + Clone> {
    storage: S,
    state: RefCell<AuthState>,
    listeners: RefCell<Vec<Listener>>,
}

impl<S: KeyValueStorage + Clone> AuthSession<S> {
    /// 从存储恢复会话；损坏的数据视为未登录
    pub fn restore(storage: S) -> Self {
        let state = storage
            .get(STORAGE_AUTH_SESSION_KEY)
            .and_then(|raw| serde_json::from_str::<StoredSession>(&raw).ok())
            .map(|s| AuthState::SignedIn(s.identity()))
            .unwrap_or_default();

        Self {
            storage,
            state: RefCell::new(state),
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// 订阅状态变化；立即以当前状态回调一次
    ///
    /// 回调期间不持有任何借用，监听器内可以再次订阅或切换状态。
    pub fn subscribe(&self, listener: impl Fn(&AuthState) + 'static) {
        let current = self.state();
        listener(&current);
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    fn transition(&self, next: AuthState) {
        if *self.state.borrow() == next {
            return;
        }
        *self.state.borrow_mut() = next.clone();
        let listeners: Vec<Listener> = self.listeners.borrow().clone();
        for listener in listeners {
            // 监听器内发生了新的切换，剩余监听器已收到更新的状态
            if *self.state.borrow() != next {
                break;
            }
            listener(&next);
        }
    }

    /// 保存新会话并切换为已登录
    pub fn establish(&self, session: StoredSession) {
        match serde_json::to_string(&session) {
            Ok(raw) => {
                if !self.storage.set(STORAGE_AUTH_SESSION_KEY, &raw) {
                    error!("[Auth] failed to persist session");
                }
            }
            Err(e) => error!("[Auth] failed to encode session: {}", e),
        }
        self.transition(AuthState::SignedIn(session.identity()));
    }

    /// 退出登录，同时清除本地订阅标记
    pub fn sign_out(&self) {
        self.storage.delete(STORAGE_AUTH_SESSION_KEY);
        PremiumStore::new(self.storage.clone()).clear();
        self.transition(AuthState::SignedOut);
    }
}

/// 校验输入 → 调用身份提供方 → 建立会话
pub async fn authenticate<P, S>(
    provider: &P,
    session: &AuthSession<S>,
    mode: AuthMode,
    email: &str,
    password: &str,
) -> Result<(), AuthError>
where
    P: IdentityProvider + ?Sized,
    S: KeyValueStorage + Clone,
{
    let email = email.trim();
    if is_blank(email) || password.is_empty() {
        return Err(AuthError::MissingFields);
    }
    if !is_valid_email(email) {
        return Err(AuthError::InvalidEmail);
    }

    let stored = provider.authenticate(mode, email, password).await?;
    log!("[Auth] signed in as {}", stored.email);
    session.establish(stored);
    Ok(())
}

// =========================================================
// Leptos 上下文
// =========================================================

/// 认证上下文
///
/// `state` 镜像 `AuthSession` 的状态，`session` 持有会话本体。
#[derive(Clone, Copy)]
pub struct AuthContext {
    pub state: RwSignal<AuthState>,
    session: StoredValue<Rc<AuthSession<BrowserStorage>>, LocalStorage>,
}

impl AuthContext {
    /// 恢复会话并把状态变化同步到信号
    pub fn new() -> Self {
        let session = Rc::new(AuthSession::restore(BrowserStorage));
        let state = RwSignal::new(session.state());
        session.subscribe(move |next| state.set(next.clone()));

        Self {
            state,
            session: StoredValue::new_local(session),
        }
    }

    /// 获取认证状态信号（用于路由服务注入）
    pub fn state_signal(&self) -> Signal<AuthState> {
        self.state.into()
    }

    pub fn session(&self) -> Rc<AuthSession<BrowserStorage>> {
        self.session.get_value()
    }

    pub fn sign_out(&self) {
        self.session.with_value(|s| s.sign_out());
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::MemoryStorage;
    use litreview_shared::STORAGE_PREMIUM_KEY;

    struct MockIdentity {
        result: Result<StoredSession, AuthError>,
        calls: RefCell<Vec<(AuthMode, String)>>,
    }

    impl MockIdentity {
        fn ok(email: &str) -> Self {
            Self {
                result: Ok(session_for(email)),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn failing(err: AuthError) -> Self {
            Self {
                result: Err(err),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    #[async_trait(?Send)]
    impl IdentityProvider for MockIdentity {
        async fn authenticate(
            &self,
            mode: AuthMode,
            email: &str,
            _password: &str,
        ) -> Result<StoredSession, AuthError> {
            self.calls.borrow_mut().push((mode, email.to_string()));
            self.result.clone()
        }
    }

    fn session_for(email: &str) -> StoredSession {
        StoredSession {
            uid: "uid-1".into(),
            email: email.into(),
            id_token: "token".into(),
            refresh_token: "refresh".into(),
        }
    }

    fn recorder(session: &AuthSession<MemoryStorage>) -> Rc<RefCell<Vec<AuthState>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        session.subscribe(move |s| sink.borrow_mut().push(s.clone()));
        seen
    }

    #[test]
    fn test_subscribe_fires_once_with_current_state() {
        let session = AuthSession::restore(MemoryStorage::new());
        let seen = recorder(&session);
        assert_eq!(*seen.borrow(), vec![AuthState::SignedOut]);
    }

    #[test]
    fn test_listener_may_sign_out_and_subscribe_during_notification() {
        let session = Rc::new(AuthSession::restore(MemoryStorage::new()));
        let weak = Rc::downgrade(&session);
        let late = Rc::new(RefCell::new(Vec::new()));

        let late_sink = late.clone();
        session.subscribe(move |state| {
            let Some(session) = weak.upgrade() else {
                return;
            };
            if state.is_signed_in() {
                let sink = late_sink.clone();
                session.subscribe(move |s| sink.borrow_mut().push(s.clone()));
                session.sign_out();
            }
        });
        let seen = recorder(&session);

        session.establish(session_for("ada@example.com"));

        assert_eq!(session.state(), AuthState::SignedOut);
        assert_eq!(seen.borrow().last(), Some(&AuthState::SignedOut));
        assert!(!seen.borrow().iter().any(AuthState::is_signed_in));
        assert_eq!(late.borrow().first().map(AuthState::is_signed_in), Some(true));
        assert_eq!(late.borrow().last(), Some(&AuthState::SignedOut));
    }

    #[test]
    fn test_restore_from_storage() {
        let storage = MemoryStorage::new();
        storage.put_raw(
            STORAGE_AUTH_SESSION_KEY,
            &serde_json::to_string(&session_for("ada@example.com")).unwrap(),
        );
        let session = AuthSession::restore(storage);
        assert_eq!(session.state().email(), Some("ada@example.com"));
    }

    #[test]
    fn test_corrupt_session_reads_as_signed_out() {
        let storage = MemoryStorage::new();
        storage.put_raw(STORAGE_AUTH_SESSION_KEY, "{not json");
        assert_eq!(AuthSession::restore(storage).state(), AuthState::SignedOut);
    }

    #[test]
    fn test_transitions_notify_and_sign_out_clears_premium() {
        let storage = MemoryStorage::new();
        storage.put_raw(STORAGE_PREMIUM_KEY, "true");
        let session = AuthSession::restore(storage.clone());
        let seen = recorder(&session);

        session.establish(session_for("ada@example.com"));
        // 相同状态不重复通知
        session.establish(session_for("ada@example.com"));
        session.sign_out();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        assert!(seen[1].is_signed_in());
        assert_eq!(seen[2], AuthState::SignedOut);
        assert_eq!(storage.raw(STORAGE_AUTH_SESSION_KEY), None);
        assert_eq!(storage.raw(STORAGE_PREMIUM_KEY), None);
    }

    #[tokio::test]
    async fn test_authenticate_validates_before_calling_provider() {
        let provider = MockIdentity::ok("ada@example.com");
        let session = AuthSession::restore(MemoryStorage::new());

        let err = authenticate(&provider, &session, AuthMode::SignIn, " ", "pw")
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::MissingFields);

        let err = authenticate(&provider, &session, AuthMode::SignIn, "ada@", "pw")
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidEmail);
        assert!(provider.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_authenticate_success_establishes_session() {
        let storage = MemoryStorage::new();
        let provider = MockIdentity::ok("ada@example.com");
        let session = AuthSession::restore(storage.clone());

        authenticate(&provider, &session, AuthMode::SignUp, " ada@example.com ", "secret1")
            .await
            .unwrap();

        assert_eq!(
            provider.calls.borrow()[0],
            (AuthMode::SignUp, "ada@example.com".to_string())
        );
        assert_eq!(session.state().email(), Some("ada@example.com"));
        assert!(storage.raw(STORAGE_AUTH_SESSION_KEY).is_some());
    }

    #[tokio::test]
    async fn test_provider_error_leaves_state_untouched() {
        let provider = MockIdentity::failing(AuthError::InvalidCredentials);
        let session = AuthSession::restore(MemoryStorage::new());

        let err = authenticate(&provider, &session, AuthMode::SignIn, "a@b.co", "x")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password.");
        assert_eq!(session.state(), AuthState::SignedOut);
    }

    #[test]
    fn test_provider_code_mapping() {
        assert_eq!(
            AuthError::from_provider_code("WEAK_PASSWORD : Password should be at least 6 characters"),
            AuthError::WeakPassword
        );
        assert_eq!(
            AuthError::from_provider_code("INVALID_LOGIN_CREDENTIALS"),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            AuthError::from_provider_code("OPERATION_NOT_ALLOWED"),
            AuthError::Provider("OPERATION_NOT_ALLOWED".into())
        );
    }

    #[test]
    fn test_parse_token_response() {
        let ok = r#"{"localId":"abc","email":"ada@example.com","idToken":"t","refreshToken":"r","expiresIn":"3600"}"#;
        let session = parse_token_response(200, ok, "ignored@example.com").unwrap();
        assert_eq!(session.uid, "abc");
        assert_eq!(session.email, "ada@example.com");

        let err = r#"{"error":{"code":400,"message":"EMAIL_EXISTS","errors":[]}}"#;
        assert_eq!(
            parse_token_response(400, err, "a@b.co").unwrap_err(),
            AuthError::EmailExists
        );
        assert_eq!(
            parse_token_response(503, "<html>", "a@b.co").unwrap_err(),
            AuthError::Provider("HTTP 503".into())
        );
    }
}
