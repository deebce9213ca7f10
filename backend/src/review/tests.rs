use super::*;
use crate::literature::{crossref, openalex, semantic_scholar};
use crate::llm::tests::MockChatModel;
use crate::utils::request::MockHttpClient;
use serde_json::json;

// =========================================================
// 辅助函数
// =========================================================

fn request(topic: &str) -> GenerateReviewRequest {
    GenerateReviewRequest {
        topic: topic.to_string(),
        objectives: None,
        field: "medicine".to_string(),
        max_sources: 10,
        review_length: "comprehensive".to_string(),
    }
}

fn client_with_one_paper() -> MockHttpClient {
    let client = MockHttpClient::new();
    client.mock_response(
        semantic_scholar::SEARCH_URL,
        200,
        json!({"data": [{
            "title": "Machine Learning in Diagnostics.",
            "abstract": "a".repeat(250),
            "authors": [{"name": "Ada Lovelace"}, {"name": "Alan Turing"}],
            "year": 2020,
            "url": "https://s2.example/p"
        }]}),
    );
    client.mock_response(openalex::WORKS_URL, 200, json!({"results": []}));
    client.mock_response(crossref::WORKS_URL, 200, json!({"message": {"items": []}}));
    client
}

// =========================================================
// 校验
// =========================================================

#[tokio::test]
async fn test_blank_topic_is_rejected() {
    let client = MockHttpClient::new();
    let model = MockChatModel::replying("unused");
    let service = ReviewService::new(&client, &model);

    let err = service.generate(request("   ")).await.unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert!(client.requests.borrow().is_empty());
}

#[tokio::test]
async fn test_max_sources_is_clamped() {
    let client = MockHttpClient::new();
    let model = MockChatModel::replying("unused");
    let service = ReviewService::new(&client, &model);

    let mut req = request("graph theory");
    req.max_sources = 500;
    service.generate(req).await.unwrap();

    // 50 / 3 = 16 条每个数据源
    let sent = client.requests_to(openalex::WORKS_URL);
    assert!(sent[0].full_url().unwrap().contains("per_page=16"));
}

// =========================================================
// 生成流程
// =========================================================

#[tokio::test]
async fn test_no_papers_returns_guidance_without_calling_model() {
    let client = MockHttpClient::new();
    let model = MockChatModel::replying("unused");
    let service = ReviewService::new(&client, &model);

    let resp = service.generate(request("obscure topic")).await.unwrap();
    assert!(resp.success);
    assert_eq!(
        resp.review,
        "No relevant literature found for the topic: obscure topic. Please try a different search term or broader topic."
    );
    assert!(resp.sources.is_empty());
    assert_eq!(resp.total_sources, Some(0));
    assert!(model.prompts.borrow().is_empty());
}

#[tokio::test]
async fn test_review_with_sources_and_references() {
    let client = client_with_one_paper();
    let model = MockChatModel::replying("Synthesised review.\n");
    let service = ReviewService::new(&client, &model);

    let resp = service
        .generate(request("Machine learning in healthcare diagnostics"))
        .await
        .unwrap();

    assert_eq!(resp.topic, "Machine learning in healthcare diagnostics");
    assert_eq!(resp.field.as_deref(), Some("medicine"));
    assert_eq!(resp.total_sources, Some(1));
    assert_eq!(resp.sources.len(), 1);

    let src = &resp.sources[0];
    assert_eq!(src.authors, vec!["Ada Lovelace", "Alan Turing"]);
    assert_eq!(src.year, Some(2020));
    assert_eq!(src.abstract_text, format!("{}...", "a".repeat(200)));
    assert_eq!(src.source.as_deref(), Some("Semantic Scholar"));

    assert_eq!(
        resp.review,
        "Synthesised review.\n\nReferences (APA)\n- Lovelace, A. & Turing, A. (2020). Machine Learning in Diagnostics. https://s2.example/p"
    );

    let prompts = model.prompts.borrow();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].0, prompts::SYSTEM_PROMPT);
    assert!(prompts[0].1.contains("Title: Machine Learning in Diagnostics."));
}

#[tokio::test]
async fn test_model_failure_propagates_as_upstream_error() {
    let client = client_with_one_paper();
    let model = MockChatModel::failing("model unavailable");
    let service = ReviewService::new(&client, &model);

    let err = service.generate(request("Machine learning")).await.unwrap_err();
    assert_eq!(err.status_code(), 502);
    assert_eq!(err.message(), "model unavailable");
}

#[test]
fn test_preview_abstract_counts_chars() {
    assert_eq!(preview_abstract("short"), "short");
    let long = "é".repeat(201);
    let preview = preview_abstract(&long);
    assert_eq!(preview.chars().count(), 203);
    assert!(preview.ends_with("..."));
}
