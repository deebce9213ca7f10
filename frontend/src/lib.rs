//! LitReview 前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::route`: 路由定义与认证守卫（领域模型）
//! - `web::router`: 路由服务（核心引擎）
//! - `auth`: 身份认证与会话
//! - `library` / `entitlement`: 本地持久化的综述库与订阅标记
//! - `generator` / `payment` / `contact`: 各页面的表单逻辑
//! - `components`: UI 组件层

mod api;
mod auth;
mod config;
mod contact;
mod entitlement;
mod generator;
mod library;
mod payment;
mod components {
    pub mod contact;
    pub mod dashboard;
    mod icons;
    mod library_panel;
    pub mod login;
    pub mod nav;
    mod payment_dialog;
    pub mod pricing;
}

use crate::auth::AuthContext;
use crate::components::contact::ContactPage;
use crate::components::dashboard::DashboardPage;
use crate::components::login::EntryPage;
use crate::components::nav::SiteNav;
use crate::components::pricing::PricingPage;
use crate::config::FrontendConfig;

use leptos::prelude::*;

// 原生 Web API 封装模块
// 此模块提供对浏览器原生 API 的轻量级封装，替代 gloo-* 系列 crate，
// 以减小 WASM 二进制体积。
pub(crate) mod web {
    mod download;
    mod http;
    pub mod route;
    pub mod router;
    mod share;
    mod storage;
    mod timer;

    pub use download::save_text_file;
    pub use http::HttpClient;
    pub use share::{ShareOutcome, share_or_copy};
    #[cfg(test)]
    pub use storage::MemoryStorage;
    pub use storage::{BrowserStorage, KeyValueStorage};
    pub use timer::sleep;
}

use web::route::AppRoute;
use web::router::{Link, Router, RouterOutlet};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Entry => view! { <EntryPage /> }.into_any(),
        AppRoute::Dashboard => view! { <DashboardPage /> }.into_any(),
        AppRoute::Pricing => view! { <PricingPage /> }.into_any(),
        AppRoute::Contact => view! { <ContactPage /> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-[80vh] bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"Page not found"</p>
                    <Link to=AppRoute::Entry class="btn btn-primary mt-6">"Back to home"</Link>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 构建期配置
    provide_context(FrontendConfig::load());

    // 2. 恢复会话并创建认证上下文
    let auth_ctx = AuthContext::new();
    provide_context(auth_ctx);

    // 3. 认证状态信号注入路由服务，路由层不依赖身份提供方
    let auth_state = auth_ctx.state_signal();

    view! {
        <Router auth_state=auth_state>
            <SiteNav />
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
