use serde::Deserialize;
use serde_json::json;

use crate::error::{ServiceError, ServiceResult};
use crate::utils::request::{HttpClient, HttpRequest};

pub const GROQ_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// 对话补全模型
#[async_trait::async_trait(?Send)]
pub trait ChatModel {
    async fn complete(&self, system: &str, user: &str) -> ServiceResult<String>;
}

// =========================================================
// Groq (OpenAI 兼容接口)
// =========================================================

pub struct GroqChat<'a, C: HttpClient> {
    client: &'a C,
    api_key: Option<String>,
    model: String,
}

impl<'a, C: HttpClient> GroqChat<'a, C> {
    pub fn new(client: &'a C, api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            api_key,
            model: model.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Completion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[async_trait::async_trait(?Send)]
impl<'a, C: HttpClient> ChatModel for GroqChat<'a, C> {
    async fn complete(&self, system: &str, user: &str) -> ServiceResult<String> {
        // key 只在真正需要调用模型时才检查
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ServiceError::config(
                "GROQ_API_KEY is not set. Please add it to the worker secrets.",
            )
            .in_op("groq.chat"));
        };

        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user}
            ]
        });
        let req = HttpRequest::post(GROQ_CHAT_URL)
            .with_bearer(api_key)
            .with_body(body);

        let resp = self
            .client
            .send(req)
            .await
            .map_err(|e| e.in_op_with("groq.chat", &self.model))?;

        if !resp.is_success() {
            let reason = serde_json::from_str::<ErrorEnvelope>(&resp.body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| resp.body.clone());
            return Err(ServiceError::external_api(format!(
                "Model request failed with status {}: {}",
                resp.status, reason
            ))
            .in_op_with("groq.chat", &self.model));
        }

        let completion: Completion = resp.json().map_err(|e| e.in_op("groq.decode"))?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| {
                ServiceError::external_api("Model returned an empty completion").in_op("groq.decode")
            })
    }
}

// =========================================================
// 测试工具: MockChatModel
// =========================================================
