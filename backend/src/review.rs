use litreview_shared::{
    GenerateReviewRequest, GenerateReviewResponse, MAX_SOURCES_LIMIT, Source,
};

use crate::citation;
use crate::error::{ServiceError, ServiceResult};
use crate::literature::{LiteratureSearch, Paper};
use crate::llm::ChatModel;
use crate::prompts;
use crate::utils::request::HttpClient;

const ABSTRACT_PREVIEW_CHARS: usize = 200;

pub fn no_results_message(topic: &str) -> String {
    format!(
        "No relevant literature found for the topic: {}. Please try a different search term or broader topic.",
        topic
    )
}

/// 按字符截断摘要，超长时追加 `...`
pub fn preview_abstract(text: &str) -> String {
    if text.chars().count() > ABSTRACT_PREVIEW_CHARS {
        let head: String = text.chars().take(ABSTRACT_PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn to_source(paper: &Paper) -> Source {
    Source {
        title: paper.title.clone(),
        authors: paper.authors.clone(),
        year: paper.year,
        abstract_text: preview_abstract(&paper.abstract_text),
        url: paper.url.clone(),
        source: Some(paper.provider.label().to_string()),
    }
}

/// 检索 → 模型综述 → 来源整理与 APA 参考文献
pub struct ReviewService<'a, C: HttpClient, M: ChatModel> {
    search: LiteratureSearch<'a, C>,
    model: &'a M,
}

impl<'a, C: HttpClient, M: ChatModel> ReviewService<'a, C, M> {
    pub fn new(client: &'a C, model: &'a M) -> Self {
        Self {
            search: LiteratureSearch::new(client),
            model,
        }
    }

    pub async fn generate(&self, req: GenerateReviewRequest) -> ServiceResult<GenerateReviewResponse> {
        let topic = req.topic.trim().to_string();
        if topic.is_empty() {
            return Err(ServiceError::invalid_input("Topic is required").in_op("review.validate"));
        }
        let max_sources = req.max_sources.clamp(1, MAX_SOURCES_LIMIT) as usize;

        let papers = self.search.search(&topic, max_sources).await;
        if papers.is_empty() {
            return Ok(GenerateReviewResponse {
                success: true,
                review: no_results_message(&topic),
                topic,
                field: Some(req.field),
                sources: Vec::new(),
                total_sources: Some(0),
                error: None,
            });
        }

        let prompt = prompts::analysis_prompt(
            &topic,
            &req.field,
            req.objectives(),
            &papers,
            req.review_length(),
        );
        let body = self
            .model
            .complete(prompts::SYSTEM_PROMPT, &prompt)
            .await
            .map_err(|e| e.in_op_with("review.generate", topic.as_str()))?;

        let sources: Vec<Source> = papers.iter().map(to_source).collect();
        let mut review = body.trim_end().to_string();
        if let Some(references) = citation::references_block(&sources) {
            review.push_str(&references);
        }

        log_info!(
            "[Review] topic={:?} sources={} chars={}",
            topic,
            sources.len(),
            review.len()
        );

        Ok(GenerateReviewResponse {
            success: true,
            topic,
            field: Some(req.field),
            review,
            total_sources: Some(papers.len()),
            sources,
            error: None,
        })
    }
}

#[cfg(test)]
mod tests;
