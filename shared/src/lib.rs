use serde::{Deserialize, Serialize};

pub mod date;
pub mod protocol;
pub mod serde_helper;
pub mod validation;

pub use chrono;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const SERVICE_NAME: &str = "LitReview AI";

/// 已保存综述集合（JSON 数组）
pub const STORAGE_REVIEWS_KEY: &str = "literatureReviews";
/// 身份会话（JSON）
pub const STORAGE_AUTH_SESSION_KEY: &str = "nzeru_auth_session";
pub const STORAGE_PREMIUM_KEY: &str = "nzeru_is_premium";
pub const STORAGE_PLAN_KEY: &str = "nzeru_plan";
pub const STORAGE_PLAN_AMOUNT_KEY: &str = "nzeru_plan_amount";
pub const STORAGE_TXN_ID_KEY: &str = "nzeru_txn_id";
pub const STORAGE_PLAN_ACTIVATED_AT_KEY: &str = "nzeru_plan_activated_at";

pub const DEFAULT_FIELD: &str = "general";
pub const DEFAULT_MAX_SOURCES: u32 = 20;
pub const MAX_SOURCES_LIMIT: u32 = 50;
pub const MIN_TOPIC_LEN: usize = 5;

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

/// 一条文献引用，嵌入在综述结果中
///
/// `authors` 在反序列化边界统一为有序字符串列表，
/// 线上格式既可能是单个字符串也可能是数组。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Source {
    #[serde(default, deserialize_with = "serde_helper::null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "serde_helper::authors")]
    pub authors: Vec<String>,
    #[serde(default, deserialize_with = "serde_helper::year")]
    pub year: Option<i32>,
    #[serde(
        rename = "abstract",
        default,
        deserialize_with = "serde_helper::null_as_default"
    )]
    pub abstract_text: String,
    #[serde(default, deserialize_with = "serde_helper::null_as_default")]
    pub url: String,
    /// 来源平台标签，如 "OpenAlex"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Source {
    pub fn authors_line(&self) -> String {
        self.authors.join(", ")
    }

    pub fn year_label(&self) -> String {
        self.year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }
}

/// 综述篇幅
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewLength {
    Brief,
    Standard,
    #[default]
    Comprehensive,
}

impl ReviewLength {
    /// 宽松解析：未知取值回落到默认篇幅
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "brief" | "short" => Self::Brief,
            "standard" | "medium" | "moderate" => Self::Standard,
            _ => Self::Comprehensive,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Brief => "brief",
            Self::Standard => "standard",
            Self::Comprehensive => "comprehensive",
        }
    }
}

fn default_field() -> String {
    DEFAULT_FIELD.to_string()
}

fn default_max_sources() -> u32 {
    DEFAULT_MAX_SOURCES
}

fn default_review_length() -> String {
    ReviewLength::default().as_str().to_string()
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateReviewRequest {
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objectives: Option<String>,
    #[serde(default = "default_field")]
    pub field: String,
    #[serde(default = "default_max_sources")]
    pub max_sources: u32,
    #[serde(default = "default_review_length")]
    pub review_length: String,
}

impl GenerateReviewRequest {
    pub fn review_length(&self) -> ReviewLength {
        ReviewLength::from_label(&self.review_length)
    }

    /// 非空的研究目标
    pub fn objectives(&self) -> Option<&str> {
        self.objectives
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateReviewResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default, deserialize_with = "serde_helper::null_as_default")]
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, deserialize_with = "serde_helper::null_as_default")]
    pub review: String,
    #[serde(default, deserialize_with = "serde_helper::null_as_default")]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub total_sources: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerateReviewResponse {
    /// 展示用的来源数量：`total_sources` 为空或为 0 时回落到列表长度
    pub fn source_count(&self) -> usize {
        self.total_sources
            .filter(|n| *n > 0)
            .unwrap_or(self.sources.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanId {
    Pro,
    Enterprise,
}

impl PlanId {
    pub const ALL: [PlanId; 2] = [PlanId::Pro, PlanId::Enterprise];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanId::Pro => "pro",
            PlanId::Enterprise => "enterprise",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PlanId::Pro => "Pro Plan",
            PlanId::Enterprise => "Enterprise Plan",
        }
    }

    /// 每月价格（美元）；年付按月折算
    pub fn monthly_price(&self, billing: BillingCycle) -> u32 {
        match (self, billing) {
            (PlanId::Pro, BillingCycle::Monthly) => 19,
            (PlanId::Pro, BillingCycle::Yearly) => 15,
            (PlanId::Enterprise, BillingCycle::Monthly) => 49,
            (PlanId::Enterprise, BillingCycle::Yearly) => 39,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    #[default]
    Monthly,
    Yearly,
}

impl BillingCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Yearly => "yearly",
        }
    }

    pub fn period_label(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "/month",
            BillingCycle::Yearly => "/month (billed yearly)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
    pub plan: PlanId,
    pub price: String,
    pub billing: BillingCycle,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub success: bool,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// HTTP 错误响应体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            service: SERVICE_NAME.to_string(),
        }
    }
}
