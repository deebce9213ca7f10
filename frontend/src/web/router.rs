//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，所有对 window.history 的操作都集中在此模块。
//! 导航流程："监听 -> 守卫(gate) -> 处理 -> 加载"。

use leptos::logging::log;
use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::route::{AppRoute, GateAction, gate, shown_identity};
use crate::auth::AuthState;

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 推送 History 状态
fn push_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 替换 History 状态（用于重定向）
fn replace_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 守卫后真正要展示的路由
fn resolve(state: &AuthState, target: AppRoute) -> AppRoute {
    match gate(state, &target) {
        GateAction::Redirect(to) => {
            log!("[Router] {} -> {} (auth gate)", target, to);
            to
        }
        GateAction::ShowIdentity(_) | GateAction::Stay => target,
    }
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
/// 认证状态以信号形式注入，路由层不直接依赖身份提供方。
#[derive(Clone, Copy)]
pub struct RouterService {
    current_route: ReadSignal<AppRoute>,
    set_route: WriteSignal<AppRoute>,
    auth_state: Signal<AuthState>,
}

impl RouterService {
    fn new(auth_state: Signal<AuthState>) -> Self {
        let requested = AppRoute::from_path(&current_path());
        let initial = resolve(&auth_state.get_untracked(), requested.clone());
        if initial != requested {
            replace_history_state(initial.to_path());
        }
        let (current_route, set_route) = signal(initial);

        Self {
            current_route,
            set_route,
            auth_state,
        }
    }

    /// 获取当前路由信号
    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    /// 当前页面经守卫放行后展示的身份（email）
    pub fn identity(&self) -> Signal<Option<String>> {
        let current_route = self.current_route;
        let auth_state = self.auth_state;
        Signal::derive(move || shown_identity(&auth_state.get(), &current_route.get()))
    }

    /// 导航到指定路由（经过认证守卫）
    pub fn navigate(&self, route: AppRoute) {
        let target = resolve(&self.auth_state.get_untracked(), route);
        push_history_state(target.to_path());
        self.set_route.set(target);
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let set_route = self.set_route;
        let auth_state = self.auth_state;

        let closure = Closure::<dyn Fn()>::new(move || {
            let requested = AppRoute::from_path(&current_path());
            let target = resolve(&auth_state.get_untracked(), requested.clone());
            if target != requested {
                replace_history_state(target.to_path());
            }
            set_route.set(target);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 认证状态变化时重新执行守卫
    fn setup_auth_redirect(&self) {
        let current_route = self.current_route;
        let set_route = self.set_route;
        let auth_state = self.auth_state;

        Effect::new(move |_| {
            let state = auth_state.get();
            let route = current_route.get_untracked();

            if let GateAction::Redirect(to) = gate(&state, &route) {
                log!("[Router] Auth state changed, redirecting {} -> {}", route, to);
                push_history_state(to.to_path());
                set_route.set(to);
            }
        });
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(auth_state: Signal<AuthState>) -> RouterService {
    let router = RouterService::new(auth_state);

    router.init_popstate_listener();
    router.setup_auth_redirect();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
#[component]
pub fn Router(
    /// 认证状态信号
    auth_state: Signal<AuthState>,
    children: Children,
) -> impl IntoView {
    provide_router(auth_state);

    children()
}

/// 路由出口组件
///
/// 根据当前路由状态渲染对应的组件。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || {
        let current = router.current_route().get();
        matcher(current)
    }
}

/// 站内链接：拦截点击，走路由服务
#[component]
pub fn Link(
    to: AppRoute,
    #[prop(optional, into)] class: String,
    children: Children,
) -> impl IntoView {
    let router = use_router();
    let href = to.to_path();

    let on_click = move |ev: web_sys::MouseEvent| {
        ev.prevent_default();
        router.navigate(to.clone());
    };

    view! {
        <a href=href class=class on:click=on_click>
            {children()}
        </a>
    }
}
