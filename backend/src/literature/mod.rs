//! 多平台学术文献检索
//!
//! 三个数据源并发查询，单个数据源失败只记录日志并按空结果处理，
//! 合并后按标题去重、按年份倒序并截断。

use std::collections::HashSet;

use crate::error::ServiceResult;
use crate::utils::request::HttpClient;

pub mod crossref;
pub mod openalex;
pub mod semantic_scholar;

/// 每个数据源至少取这么多条
const MIN_PER_PROVIDER: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAlex,
    Crossref,
    SemanticScholar,
}

impl Provider {
    pub fn label(&self) -> &'static str {
        match self {
            Provider::OpenAlex => "OpenAlex",
            Provider::Crossref => "Crossref",
            Provider::SemanticScholar => "Semantic Scholar",
        }
    }
}

/// 归一化后的检索结果
#[derive(Debug, Clone, PartialEq)]
pub struct Paper {
    pub title: String,
    pub authors: Vec<String>,
    pub abstract_text: String,
    pub year: Option<i32>,
    /// PDF 或落地页链接
    pub url: String,
    pub provider: Provider,
}

impl Paper {
    pub fn new(provider: Provider) -> Self {
        Self {
            title: String::new(),
            authors: Vec::new(),
            abstract_text: String::new(),
            year: None,
            url: String::new(),
            provider,
        }
    }

    fn title_key(&self) -> String {
        self.title.trim().to_lowercase()
    }
}

pub fn per_provider_limit(max_results: usize) -> usize {
    (max_results / 3).max(MIN_PER_PROVIDER)
}

/// 去重（空标题丢弃，先到先得）→ 按年份稳定倒序（无年份视为 0）→ 截断
pub fn merge_results(batches: Vec<Vec<Paper>>, max_results: usize) -> Vec<Paper> {
    let mut seen = HashSet::new();
    let mut merged: Vec<Paper> = batches
        .into_iter()
        .flatten()
        .filter(|p| {
            let key = p.title_key();
            !key.is_empty() && seen.insert(key)
        })
        .collect();

    merged.sort_by_key(|p| std::cmp::Reverse(p.year.unwrap_or(0)));
    merged.truncate(max_results);
    merged
}

pub struct LiteratureSearch<'a, C: HttpClient> {
    client: &'a C,
}

impl<'a, C: HttpClient> LiteratureSearch<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    pub async fn search(&self, topic: &str, max_results: usize) -> Vec<Paper> {
        let limit = per_provider_limit(max_results);

        let (openalex, crossref, semantic) = futures::join!(
            openalex::search(self.client, topic, limit),
            crossref::search(self.client, topic, limit),
            semantic_scholar::search(self.client, topic, limit),
        );

        let batches = vec![
            settle(Provider::OpenAlex, openalex),
            settle(Provider::Crossref, crossref),
            settle(Provider::SemanticScholar, semantic),
        ];
        let merged = merge_results(batches, max_results);
        log_info!(
            "[Search] topic={:?} limit={} merged={}",
            topic,
            limit,
            merged.len()
        );
        merged
    }
}

fn settle(provider: Provider, result: ServiceResult<Vec<Paper>>) -> Vec<Paper> {
    match result {
        Ok(papers) => papers,
        Err(e) => {
            log_error!("[Search] {} search error: {}", provider.label(), e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests;
