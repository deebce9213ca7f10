use crate::error::{ServiceError, ServiceResult};
use futures::future::{Either, select};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use worker::{Delay, Fetch, Headers, Request, RequestInit, Url, wasm_bindgen};

#[cfg(test)]
use std::cell::RefCell;

// =========================================================
// 常量定义
// =========================================================

pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl From<HttpMethod> for worker::Method {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => worker::Method::Get,
            HttpMethod::Post => worker::Method::Post,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub query: Vec<(String, String)>,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            query: Vec::new(),
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn get(url: &str) -> Self {
        Self::new(url, HttpMethod::Get)
    }

    pub fn post(url: &str) -> Self {
        Self::new(url, HttpMethod::Post)
    }

    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_bearer(self, token: &str) -> Self {
        self.with_header("Authorization", &format!("Bearer {}", token))
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body.to_string());
        self.with_header("Content-Type", "application/json")
    }

    /// 拼接查询参数后的完整 URL（参数按 form-urlencoded 编码）
    pub fn full_url(&self) -> ServiceResult<String> {
        if self.query.is_empty() {
            return Ok(self.url.clone());
        }
        Url::parse_with_params(&self.url, &self.query)
            .map(|u| u.to_string())
            .map_err(|e| {
                ServiceError::internal(format!("Invalid URL: {}", e)).in_op_with("http.url", &self.url)
            })
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 上游返回体无法解析时视为上游错误 (502)
    pub fn json<T: DeserializeOwned>(&self) -> ServiceResult<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            ServiceError::external_api(format!("Invalid upstream response: {}", e)).with_source(e)
        })
    }
}

#[async_trait::async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> ServiceResult<HttpResponse>;
}

// =========================================================
// 实现层: Worker 客户端
// =========================================================

/// 基于 Workers `fetch` 的客户端，每个请求与一个 `Delay` 竞速实现超时
#[derive(Clone)]
pub struct WorkerHttpClient {
    timeout: Duration,
}

impl WorkerHttpClient {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for WorkerHttpClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

#[async_trait::async_trait(?Send)]
impl HttpClient for WorkerHttpClient {
    async fn send(&self, req: HttpRequest) -> ServiceResult<HttpResponse> {
        let url = req.full_url()?;

        let headers = Headers::new();
        for (k, v) in &req.headers {
            headers.set(k, v)?;
        }

        let mut init = RequestInit {
            method: req.method.into(),
            headers,
            ..Default::default()
        };
        if let Some(body_str) = &req.body {
            init.body = Some(wasm_bindgen::JsValue::from_str(body_str));
        }

        let worker_req = Request::new_with_init(&url, &init)?;
        let fetch = Box::pin(async move {
            let mut response = Fetch::Request(worker_req).send().await?;
            let status = response.status_code();
            let body = response.text().await?;
            Ok::<_, worker::Error>(HttpResponse { status, body })
        });
        let timeout = Box::pin(Delay::from(self.timeout));

        match select(fetch, timeout).await {
            Either::Left((Ok(resp), _)) => Ok(resp),
            Either::Left((Err(e), _)) => Err(ServiceError::external_api(e.to_string())
                .in_op_with("http.send", req.url.as_str())),
            Either::Right(_) => Err(ServiceError::external_api(format!(
                "Request timed out after {}s",
                self.timeout.as_secs()
            ))
            .in_op_with("http.send", req.url.as_str())),
        }
    }
}

// =========================================================
// 测试工具: MockHttpClient
// =========================================================

#[cfg(test)]
enum MockReply {
    Respond(u16, String),
    Fail(String),
}

/// 按 URL 前缀匹配预设响应，并记录所有发出的请求
#[cfg(test)]
pub struct MockHttpClient {
    replies: RefCell<Vec<(String, MockReply)>>,
    pub requests: RefCell<Vec<HttpRequest>>,
}

#[cfg(test)]
impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            replies: RefCell::new(Vec::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn mock_response(&self, url_prefix: &str, status: u16, body: serde_json::Value) {
        self.mock_text(url_prefix, status, &body.to_string());
    }

    pub fn mock_text(&self, url_prefix: &str, status: u16, body: &str) {
        self.replies.borrow_mut().push((
            url_prefix.to_string(),
            MockReply::Respond(status, body.to_string()),
        ));
    }

    /// 模拟传输层失败（连接错误、超时）
    pub fn mock_failure(&self, url_prefix: &str, message: &str) {
        self.replies
            .borrow_mut()
            .push((url_prefix.to_string(), MockReply::Fail(message.to_string())));
    }

    pub fn requests_to(&self, url_prefix: &str) -> Vec<HttpRequest> {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.url.starts_with(url_prefix))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
#[async_trait::async_trait(?Send)]
impl HttpClient for MockHttpClient {
    async fn send(&self, req: HttpRequest) -> ServiceResult<HttpResponse> {
        let url = req.full_url()?;
        self.requests.borrow_mut().push(req);

        let replies = self.replies.borrow();
        let matched = replies
            .iter()
            .filter(|(prefix, _)| url.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len());

        match matched {
            Some((_, MockReply::Respond(status, body))) => Ok(HttpResponse {
                status: *status,
                body: body.clone(),
            }),
            Some((_, MockReply::Fail(message))) => {
                Err(ServiceError::external_api(message.clone()).in_op_with("http.send", url))
            }
            None => Ok(HttpResponse {
                status: 404,
                body: "Not Found".to_string(),
            }),
        }
    }
}
