//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由以及认证状态下的跳转规则。

use std::fmt::Display;

use crate::auth::AuthState;

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 入口页：登录 / 注册 (默认路由)
    #[default]
    Entry,
    /// 综述生成面板 (需要认证)
    Dashboard,
    /// 价格与订阅
    Pricing,
    /// 联系我们
    Contact,
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        let path = path.trim_end_matches(".html");
        match path {
            "" | "/" | "/index" | "/login" => Self::Entry,
            "/generator" => Self::Dashboard,
            "/pricing" => Self::Pricing,
            "/contact" => Self::Contact,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Entry => "/",
            Self::Dashboard => "/generator",
            Self::Pricing => "/pricing",
            Self::Contact => "/contact",
            Self::NotFound => "/404",
        }
    }

    /// 定义该路由是否需要认证
    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::Dashboard)
    }

    /// 已认证用户是否应该离开此路由
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Entry)
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

// =========================================================
// 认证守卫
// =========================================================

/// 守卫判定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateAction {
    /// 跳转到另一路由
    Redirect(AppRoute),
    /// 留在当前页并展示身份
    ShowIdentity(String),
    /// 留在当前页
    Stay,
}

/// 认证状态 × 当前页面 → 动作
///
/// | 状态     | 入口页        | 面板               | 公开页 |
/// |----------|---------------|--------------------|--------|
/// | 已登录   | → 面板        | 展示 email         | 停留   |
/// | 未登录   | 停留          | → 入口页           | 停留   |
pub fn gate(state: &AuthState, route: &AppRoute) -> GateAction {
    match state {
        AuthState::SignedIn(_) if route.should_redirect_when_authenticated() => {
            GateAction::Redirect(AppRoute::Dashboard)
        }
        AuthState::SignedIn(identity) if route.requires_auth() => {
            GateAction::ShowIdentity(identity.email.clone())
        }
        AuthState::SignedOut if route.requires_auth() => GateAction::Redirect(AppRoute::Entry),
        _ => GateAction::Stay,
    }
}

/// 当前页面应展示的身份；只有受保护页面会展示
pub fn shown_identity(state: &AuthState, route: &AppRoute) -> Option<String> {
    match gate(state, route) {
        GateAction::ShowIdentity(email) => Some(email),
        GateAction::Redirect(_) | GateAction::Stay => None,
    }
}
