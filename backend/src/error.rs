use std::fmt;

use litreview_shared::ErrorBody;
use serde::{Deserialize, Serialize};

// =========================================================
// 错误状态枚举
// =========================================================

/// 错误状态枚举
/// 包含错误对应的语义（状态码）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorStatus {
    /// 400: 请求字段校验失败
    InvalidInput,
    /// 400: JSON 解析或序列化错误
    Serialization,
    /// 400: 支付网关拒绝了这笔扣款
    PaymentDeclined,
    /// 404: 路由或资源未找到
    NotFound,
    /// 500: 运行时配置缺失或非法
    Config,
    /// 500: 其它内部错误 (Worker 运行时等)
    Internal,
    /// 502: 外部 API 调用失败 (LLM、支付网关、文献检索)
    ExternalApi,
}

impl ErrorStatus {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorStatus::InvalidInput
            | ErrorStatus::Serialization
            | ErrorStatus::PaymentDeclined => 400,
            ErrorStatus::NotFound => 404,
            ErrorStatus::Config | ErrorStatus::Internal => 500,
            ErrorStatus::ExternalApi => 502,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ErrorStatus::InvalidInput => "INVALID_INPUT",
            ErrorStatus::Serialization => "JSON_PARSE_ERROR",
            ErrorStatus::PaymentDeclined => "PAYMENT_DECLINED",
            ErrorStatus::NotFound => "RESOURCE_NOT_FOUND",
            ErrorStatus::Config => "CONFIG_ERROR",
            ErrorStatus::Internal => "INTERNAL_ERROR",
            ErrorStatus::ExternalApi => "UPSTREAM_ERROR",
        }
    }
}

// =========================================================
// 错误上下文追踪
// =========================================================

/// 结构化的错误追踪片段
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorSpan {
    /// 操作名称，如 "groq.chat", "openalex.search"
    pub operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorSpan {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: None,
        }
    }

    pub fn with_detail(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: Some(detail.into()),
        }
    }
}

// =========================================================
// 核心错误类型
// =========================================================

/// 服务层错误
///
/// - status: 错误类型/语义
/// - message: 面向客户端的错误消息
/// - source: 原始错误（可选，用于错误链）
/// - spans: 结构化的调用追踪栈
#[derive(Debug)]
pub struct ServiceError {
    pub status: ErrorStatus,
    pub message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
    spans: Vec<ErrorSpan>,
}

impl ServiceError {
    pub fn new(status: ErrorStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            source: None,
            spans: Vec::new(),
        }
    }

    // --- Convenience constructors ---

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorStatus::InvalidInput, message)
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorStatus::Serialization, message)
    }

    pub fn payment_declined(message: impl Into<String>) -> Self {
        Self::new(ErrorStatus::PaymentDeclined, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorStatus::NotFound, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorStatus::Config, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorStatus::Internal, message)
    }

    pub fn external_api(message: impl Into<String>) -> Self {
        Self::new(ErrorStatus::ExternalApi, message)
    }

    // --- Context builders ---

    pub fn in_op(mut self, operation: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::new(operation));
        self
    }

    pub fn in_op_with(mut self, operation: impl Into<String>, detail: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::with_detail(operation, detail));
        self
    }

    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // --- Accessors ---

    pub fn status_code(&self) -> u16 {
        self.status.status_code()
    }

    pub fn error_code(&self) -> &'static str {
        self.status.error_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn spans(&self) -> &[ErrorSpan] {
        &self.spans
    }

    /// 转换为 HTTP 响应体
    ///
    /// 5xx 错误只暴露消息本身，追踪栈留在日志里。
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            detail: self.message.clone(),
            code: Some(self.error_code().to_string()),
        }
    }
}

// =========================================================
// Display & Error trait 实现
// =========================================================

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error_code(), self.message)?;

        if !self.spans.is_empty() {
            write!(f, " | trace: ")?;
            for (i, span) in self.spans.iter().enumerate() {
                if i > 0 {
                    write!(f, " -> ")?;
                }
                write!(f, "{}", span.operation)?;
                if let Some(detail) = &span.detail {
                    write!(f, "({})", detail)?;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

// =========================================================
// 类型转换实现
// =========================================================

impl From<worker::Error> for ServiceError {
    fn from(e: worker::Error) -> Self {
        ServiceError::internal(e.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        ServiceError::serialization(e.to_string()).with_source(e)
    }
}
