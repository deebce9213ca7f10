//! 综述生成表单
//!
//! 流程：校验 → 禁用表单 → 单次请求 → 成功：展示结果并自动存入综述库；
//! 失败：展示错误面板并恢复表单。视图通过 `GeneratorView` 注入。

use leptos::logging::error;
use litreview_shared::date::{Clock, Timestamp};
use litreview_shared::{
    DEFAULT_FIELD, DEFAULT_MAX_SOURCES, GenerateReviewRequest, GenerateReviewResponse,
    MIN_TOPIC_LEN, ReviewLength, SERVICE_NAME, Source,
};

use crate::api::ReviewApi;
use crate::library::{NewReview, SavedReview, SavedReviewStore};
use crate::web::KeyValueStorage;

pub const NO_SOURCES_MESSAGE: &str = "No sources available.";
const FALLBACK_ERROR: &str = "An error occurred while generating the literature review.";
const MISSING_PROVENANCE: &str = "—";
const RULE_WIDTH: usize = 50;
const SHARE_PREVIEW_CHARS: usize = 200;

// =========================================================
// 表单
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorForm {
    pub topic: String,
    pub objectives: String,
    pub field: String,
    pub max_sources: u32,
    pub review_length: ReviewLength,
}

impl Default for GeneratorForm {
    fn default() -> Self {
        Self {
            topic: String::new(),
            objectives: String::new(),
            field: DEFAULT_FIELD.to_string(),
            max_sources: DEFAULT_MAX_SOURCES,
            review_length: ReviewLength::default(),
        }
    }
}

impl GeneratorForm {
    pub fn to_request(&self) -> GenerateReviewRequest {
        let objectives = self.objectives.trim();
        GenerateReviewRequest {
            topic: self.topic.trim().to_string(),
            objectives: (!objectives.is_empty()).then(|| objectives.to_string()),
            field: self.field.clone(),
            max_sources: self.max_sources,
            review_length: self.review_length.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TopicError {
    #[error("Research topic is required")]
    Missing,
    #[error("Research topic must be at least 5 characters")]
    TooShort,
}

/// 提交前的完整校验
pub fn validate_topic(topic: &str) -> Result<(), TopicError> {
    let topic = topic.trim();
    if topic.is_empty() {
        Err(TopicError::Missing)
    } else if topic.chars().count() < MIN_TOPIC_LEN {
        Err(TopicError::TooShort)
    } else {
        Ok(())
    }
}

/// 输入过程中的校验：空输入不提示
pub fn live_topic_error(topic: &str) -> Option<TopicError> {
    match validate_topic(topic) {
        Err(TopicError::TooShort) => Some(TopicError::TooShort),
        _ => None,
    }
}

// =========================================================
// 展示模型
// =========================================================

/// 单条来源卡片
#[derive(Debug, Clone, PartialEq)]
pub struct SourceCard {
    pub title: String,
    /// `X, Y (2020)`
    pub byline: String,
    pub abstract_text: String,
    pub provenance: String,
    pub url: String,
}

impl From<&Source> for SourceCard {
    fn from(source: &Source) -> Self {
        Self {
            title: source.title.clone(),
            byline: format!("{} ({})", source.authors_line(), source.year_label()),
            abstract_text: source.abstract_text.clone(),
            provenance: source
                .source
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| MISSING_PROVENANCE.to_string()),
            url: source.url.clone(),
        }
    }
}

/// 结果区域的完整内容
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewDisplay {
    pub topic_label: String,
    /// `{n} sources`
    pub count_label: String,
    pub review: String,
    pub cards: Vec<SourceCard>,
    pub record: NewReview,
    /// 保存时间；尚未保存时为空
    pub saved_at: Option<Timestamp>,
}

impl ReviewDisplay {
    pub fn new(record: NewReview) -> Self {
        let count = record
            .total_sources
            .filter(|n| *n > 0)
            .unwrap_or(record.sources.len());
        Self {
            topic_label: if record.topic.trim().is_empty() {
                "Research Topic".to_string()
            } else {
                record.topic.clone()
            },
            count_label: format!("{} sources", count),
            review: record.review.clone(),
            cards: record.sources.iter().map(SourceCard::from).collect(),
            record,
            saved_at: None,
        }
    }

    pub fn saved(mut self, at: Timestamp) -> Self {
        self.saved_at = Some(at);
        self
    }

    /// 结果标题下方的日期：已保存的记录用保存时间
    pub fn date_label(&self, now: Timestamp) -> String {
        self.saved_at.unwrap_or(now).display_date()
    }

    pub fn from_response(resp: &GenerateReviewResponse) -> Self {
        Self::new(NewReview::from_response(resp))
    }

    pub fn from_saved(saved: &SavedReview) -> Self {
        Self::new(NewReview::from(saved)).saved(saved.saved_at)
    }
}

// =========================================================
// 下载
// =========================================================

/// 纯文本下载内容
pub fn format_for_download(record: &NewReview, generated: Timestamp) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let count = record
        .total_sources
        .filter(|n| *n > 0)
        .unwrap_or(record.sources.len());

    let mut content = String::from("LITERATURE REVIEW\n");
    content.push_str(&format!("Topic: {}\n", record.topic));
    content.push_str(&format!("Generated: {}\n", generated.display_datetime()));
    content.push_str(&format!("Sources: {}\n", count));
    content.push_str(&format!("\n{}\n\n", rule));
    content.push_str(&record.review);
    content.push_str(&format!("\n\n{}\n\n", rule));
    content.push_str("SOURCES:\n\n");
    for (index, source) in record.sources.iter().enumerate() {
        content.push_str(&format!("{}. {}\n", index + 1, source.title));
        content.push_str(&format!(
            "   Authors: {} ({})\n",
            source.authors_line(),
            source.year_label()
        ));
        content.push_str(&format!("   URL: {}\n\n", source.url));
    }
    content
}

/// `literature_review_{topic}.txt`，非字母数字替换为 `_`
pub fn download_filename(topic: &str) -> String {
    let topic = if topic.is_empty() { "topic" } else { topic };
    let slug: String = topic
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("literature_review_{}.txt", slug)
}

// =========================================================
// 分享
// =========================================================

/// 系统分享面板的内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
}

pub fn share_payload(topic: &str) -> SharePayload {
    SharePayload {
        title: format!("Literature Review: {}", topic),
        text: format!(
            "Check out this AI-generated literature review on {}",
            topic
        ),
    }
}

/// 不支持系统分享时复制到剪贴板的文本：主题 + 正文前 200 字符
pub fn share_text(topic: &str, review: &str) -> String {
    let preview: String = review.chars().take(SHARE_PREVIEW_CHARS).collect();
    format!(
        "Literature Review: {}\n\n{}...\n\nGenerated by {}",
        topic, preview, SERVICE_NAME
    )
}

// =========================================================
// 控制器
// =========================================================

/// 视图绑定
pub trait GeneratorView {
    fn show_field_error(&self, message: &str);
    fn clear_field_error(&self);
    /// 请求进行中时禁用所有输入
    fn set_busy(&self, busy: bool);
    fn show_results(&self, display: ReviewDisplay);
    fn show_error(&self, message: &str);
    fn hide_error(&self);
    /// 综述库内容发生变化
    fn refresh_library(&self);
}

pub struct GeneratorController<'a, A, V, S, C>
where
    A: ReviewApi + ?Sized,
    V: GeneratorView + ?Sized,
    S: KeyValueStorage,
    C: Clock,
{
    api: &'a A,
    view: &'a V,
    library: &'a SavedReviewStore<S, C>,
}

impl<'a, A, V, S, C> GeneratorController<'a, A, V, S, C>
where
    A: ReviewApi + ?Sized,
    V: GeneratorView + ?Sized,
    S: KeyValueStorage,
    C: Clock,
{
    pub fn new(api: &'a A, view: &'a V, library: &'a SavedReviewStore<S, C>) -> Self {
        Self { api, view, library }
    }

    /// 提交表单；成功时返回自动保存的记录
    pub async fn submit(&self, form: &GeneratorForm) -> Option<SavedReview> {
        if let Err(e) = validate_topic(&form.topic) {
            self.view.show_field_error(&e.to_string());
            return None;
        }
        self.view.clear_field_error();
        self.view.hide_error();
        self.view.set_busy(true);

        let result = self.api.generate_review(&form.to_request()).await;
        self.view.set_busy(false);

        match result {
            Ok(resp) => {
                let saved = self.library.save(NewReview::from_response(&resp));
                self.view
                    .show_results(ReviewDisplay::from_response(&resp).saved(saved.saved_at));
                self.view.refresh_library();
                Some(saved)
            }
            Err(e) => {
                error!("Error generating review: {}", e);
                let message = e.to_string();
                self.view.show_error(if message.is_empty() {
                    FALLBACK_ERROR
                } else {
                    &message
                });
                None
            }
        }
    }
}
