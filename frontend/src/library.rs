//! 已保存综述库
//!
//! 设备本地的综述集合，整体以 JSON 数组存放在 `literatureReviews` 键下。
//! 读取失败（存储不可用、数据损坏）一律视为空集合；写入失败只记录警告。

use leptos::logging::warn;
use litreview_shared::date::{Clock, Timestamp};
use litreview_shared::{GenerateReviewResponse, STORAGE_REVIEWS_KEY, Source};
use serde::{Deserialize, Serialize};

use crate::web::KeyValueStorage;

const TITLE_MAX_CHARS: usize = 40;
const TITLE_KEEP_CHARS: usize = 37;

// =========================================================
// 数据模型
// =========================================================

/// 一条已保存的综述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SavedReviewRecord")]
pub struct SavedReview {
    pub id: i64,
    #[serde(rename = "savedAt")]
    pub saved_at: Timestamp,
    pub topic: String,
    pub review: String,
    pub sources: Vec<Source>,
    pub total_sources: usize,
}

/// 存储格式；`total_sources` 缺失或为 0 时按来源列表长度补齐
#[derive(Deserialize)]
struct SavedReviewRecord {
    id: i64,
    #[serde(rename = "savedAt")]
    saved_at: Timestamp,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    review: Option<String>,
    #[serde(default)]
    sources: Option<Vec<Source>>,
    #[serde(default)]
    total_sources: Option<usize>,
}

impl From<SavedReviewRecord> for SavedReview {
    fn from(r: SavedReviewRecord) -> Self {
        let sources = r.sources.unwrap_or_default();
        let total_sources = r
            .total_sources
            .filter(|n| *n > 0)
            .unwrap_or(sources.len());
        Self {
            id: r.id,
            saved_at: r.saved_at,
            topic: r.topic.unwrap_or_default(),
            review: r.review.unwrap_or_default(),
            sources,
            total_sources,
        }
    }
}

impl SavedReview {
    /// 列表中展示的标题：主题，退化为综述首行
    pub fn title(&self) -> String {
        let candidate = if self.topic.trim().is_empty() {
            self.review.lines().next().unwrap_or_default()
        } else {
            self.topic.as_str()
        };
        safe_title(candidate)
    }

    fn matches(&self, needle: &str) -> bool {
        self.topic.to_lowercase().contains(needle) || self.review.to_lowercase().contains(needle)
    }
}

/// 待保存的内容
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub topic: String,
    pub review: String,
    pub sources: Vec<Source>,
    pub total_sources: Option<usize>,
}

impl NewReview {
    pub fn from_response(resp: &GenerateReviewResponse) -> Self {
        Self {
            topic: resp.topic.clone(),
            review: resp.review.clone(),
            sources: resp.sources.clone(),
            total_sources: Some(resp.source_count()),
        }
    }
}

impl From<&SavedReview> for NewReview {
    fn from(saved: &SavedReview) -> Self {
        Self {
            topic: saved.topic.clone(),
            review: saved.review.clone(),
            sources: saved.sources.clone(),
            total_sources: Some(saved.total_sources),
        }
    }
}

/// 标题截断：超过 40 字符保留 37 字符并追加 `...`；空白时为 `Untitled`
pub fn safe_title(raw: &str) -> String {
    let t = raw.trim();
    if t.is_empty() {
        "Untitled".to_string()
    } else if t.chars().count() > TITLE_MAX_CHARS {
        let head: String = t.chars().take(TITLE_KEEP_CHARS).collect();
        format!("{}...", head)
    } else {
        t.to_string()
    }
}

// =========================================================
// 存储
// =========================================================

pub struct SavedReviewStore<S: KeyValueStorage, C: Clock> {
    storage: S,
    clock: C,
}

impl<S: KeyValueStorage, C: Clock> SavedReviewStore<S, C> {
    pub fn new(storage: S, clock: C) -> Self {
        Self { storage, clock }
    }

    /// 按存储顺序读取全部条目
    fn read_all(&self) -> Vec<SavedReview> {
        let Some(raw) = self.storage.get(STORAGE_REVIEWS_KEY) else {
            return Vec::new();
        };
        let entries = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("[Library] ignoring unreadable saved reviews: {}", e);
                return Vec::new();
            }
        };
        // 逐条解码，单条损坏不影响其余记录
        entries
            .into_iter()
            .enumerate()
            .filter_map(|(i, entry)| {
                serde_json::from_value::<SavedReview>(entry)
                    .inspect_err(|e| warn!("[Library] dropping saved review #{}: {}", i, e))
                    .ok()
            })
            .collect()
    }

    fn write_all(&self, items: &[SavedReview]) {
        let written = serde_json::to_string(items)
            .map(|raw| self.storage.set(STORAGE_REVIEWS_KEY, &raw))
            .unwrap_or(false);
        if !written {
            warn!("[Library] failed to persist {} saved reviews", items.len());
        }
    }

    /// 按保存时间倒序列出，可选大小写不敏感的主题/正文过滤
    pub fn list(&self, query: Option<&str>) -> Vec<SavedReview> {
        let mut items = self.read_all();
        if let Some(needle) = query.map(|q| q.trim().to_lowercase()).filter(|q| !q.is_empty()) {
            items.retain(|r| r.matches(&needle));
        }
        items.sort_by(|a, b| b.saved_at.cmp(&a.saved_at).then(b.id.cmp(&a.id)));
        items
    }

    /// 保存一条新记录，分配新 id 与保存时间
    pub fn save(&self, new: NewReview) -> SavedReview {
        let mut items = self.read_all();
        let now = self.clock.now();
        let next_after_max = items
            .iter()
            .map(|r| r.id)
            .max()
            .map_or(i64::MIN, |max| max.saturating_add(1));

        let total_sources = new
            .total_sources
            .filter(|n| *n > 0)
            .unwrap_or(new.sources.len());
        let saved = SavedReview {
            id: now.as_millis().max(next_after_max),
            saved_at: now,
            topic: new.topic,
            review: new.review,
            sources: new.sources,
            total_sources,
        };

        items.insert(0, saved.clone());
        self.write_all(&items);
        saved
    }

    /// 删除指定条目；不存在时不做任何事
    pub fn delete(&self, id: i64) {
        let mut items = self.read_all();
        let before = items.len();
        items.retain(|r| r.id != id);
        if items.len() != before {
            self.write_all(&items);
        }
    }

    pub fn clear(&self) {
        self.write_all(&[]);
    }

    pub fn load(&self, id: i64) -> Option<SavedReview> {
        self.read_all().into_iter().find(|r| r.id == id)
    }
}
