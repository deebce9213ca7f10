//! 分享封装
//!
//! 优先调用系统分享面板（Web Share API），不支持时退回写入剪贴板。

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::ShareData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    /// 已交给系统分享面板
    Shared,
    /// 已复制到剪贴板
    Copied,
}

/// 分享当前页面；`fallback` 为写入剪贴板的文本
pub async fn share_or_copy(title: &str, text: &str, fallback: &str) -> Result<ShareOutcome, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window is not available"))?;
    let navigator = window.navigator();

    if js_sys::Reflect::has(&navigator, &JsValue::from_str("share")).unwrap_or(false) {
        let data = ShareData::new();
        data.set_title(title);
        data.set_text(text);
        if let Ok(href) = window.location().href() {
            data.set_url(&href);
        }
        JsFuture::from(navigator.share_with_data(&data)).await?;
        return Ok(ShareOutcome::Shared);
    }

    JsFuture::from(navigator.clipboard().write_text(fallback)).await?;
    Ok(ShareOutcome::Copied)
}
