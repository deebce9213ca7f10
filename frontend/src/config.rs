//! 前端配置
//!
//! 构建时通过环境变量注入（`option_env!`），未注入时根据页面地址推断。

use leptos::prelude::*;

use crate::api::LitReviewApi;

const LOCAL_API_BASE: &str = "http://127.0.0.1:8787";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendConfig {
    /// 后端 API 根地址；空字符串表示同源
    pub api_base: String,
    /// Firebase Web API key；缺失时登录不可用
    pub firebase_api_key: Option<String>,
}

impl FrontendConfig {
    pub fn load() -> Self {
        let hostname = web_sys::window()
            .and_then(|w| w.location().hostname().ok())
            .unwrap_or_default();

        Self {
            api_base: resolve_api_base(option_env!("LITREVIEW_API_BASE"), &hostname),
            firebase_api_key: option_env!("LITREVIEW_FIREBASE_API_KEY")
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
        }
    }

    pub fn api(&self) -> LitReviewApi {
        LitReviewApi::new(self.api_base.clone())
    }
}

/// 从 Context 获取配置；未提供时现场加载
pub fn use_config() -> FrontendConfig {
    use_context::<FrontendConfig>().unwrap_or_else(FrontendConfig::load)
}

/// 显式配置优先；本地开发指向 wrangler dev，其余同源
pub fn resolve_api_base(configured: Option<&str>, hostname: &str) -> String {
    if let Some(base) = configured.map(str::trim).filter(|b| !b.is_empty()) {
        return base.trim_end_matches('/').to_string();
    }
    match hostname {
        "localhost" | "127.0.0.1" => LOCAL_API_BASE.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_api_base() {
        assert_eq!(resolve_api_base(None, "localhost"), "http://127.0.0.1:8787");
        assert_eq!(resolve_api_base(None, "127.0.0.1"), "http://127.0.0.1:8787");
        assert_eq!(resolve_api_base(None, "litreview.pages.dev"), "");
        assert_eq!(
            resolve_api_base(Some("https://api.example.com/"), "localhost"),
            "https://api.example.com"
        );
        assert_eq!(resolve_api_base(Some("  "), "example.com"), "");
    }
}
