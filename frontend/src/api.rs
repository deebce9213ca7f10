//! 后端 API 客户端
//!
//! 路径与方法由 `litreview_shared::protocol::ApiRequest` 决定，
//! 业务代码通过 `ReviewApi` trait 调用，测试时替换为 mock。

use async_trait::async_trait;
use litreview_shared::protocol::{ApiRequest, HttpMethod};
use litreview_shared::{
    ErrorBody, GenerateReviewRequest, GenerateReviewResponse, PaymentRequest,
    PaymentResponse,
};

use crate::web::HttpClient;

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(" - {}", body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// 非 2xx 响应，`body` 为原始响应文本
    #[error("HTTP error! status: {}{}", .status, body_suffix(.body))]
    Status { status: u16, body: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid response: {0}")]
    Decode(String),
    /// 服务端返回 `success: false`
    #[error("{0}")]
    Rejected(String),
}

impl ApiError {
    /// 服务端 `{detail}` 字段（若响应体是 JSON 错误体）
    pub fn detail(&self) -> Option<String> {
        match self {
            ApiError::Status { body, .. } => serde_json::from_str::<ErrorBody>(body)
                .ok()
                .map(|b| b.detail)
                .filter(|d| !d.is_empty()),
            ApiError::Rejected(msg) => Some(msg.clone()),
            _ => None,
        }
    }
}

#[async_trait(?Send)]
pub trait ReviewApi {
    async fn generate_review(
        &self,
        req: &GenerateReviewRequest,
    ) -> Result<GenerateReviewResponse, ApiError>;

    async fn process_payment(&self, req: &PaymentRequest) -> Result<PaymentResponse, ApiError>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct LitReviewApi {
    pub base_url: String,
}

impl LitReviewApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// 发送一个协议请求并解码响应
    pub async fn call<R: ApiRequest>(&self, req: &R) -> Result<R::Response, ApiError> {
        let url = self.url(R::PATH);
        let builder = match R::METHOD {
            HttpMethod::Get => HttpClient::get(&url),
            HttpMethod::Post => HttpClient::post(&url)
                .json(req)
                .map_err(|e| ApiError::Decode(e.to_string()))?,
        };

        let res = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = res.status();
        let ok = res.ok();
        let text = res
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !ok {
            return Err(ApiError::Status { status, body: text });
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait(?Send)]
impl ReviewApi for LitReviewApi {
    async fn generate_review(
        &self,
        req: &GenerateReviewRequest,
    ) -> Result<GenerateReviewResponse, ApiError> {
        let resp = self.call(req).await?;
        if !resp.success {
            return Err(ApiError::Rejected(
                resp.error
                    .unwrap_or_else(|| "Failed to generate review".to_string()),
            ));
        }
        Ok(resp)
    }

    async fn process_payment(&self, req: &PaymentRequest) -> Result<PaymentResponse, ApiError> {
        self.call(req).await
    }
}

// =========================================================
// 测试实现 (Mock)
// =========================================================
