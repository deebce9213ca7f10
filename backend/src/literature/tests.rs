use super::*;
use crate::utils::request::MockHttpClient;
use serde_json::json;
use std::collections::HashMap;

// =========================================================
// 辅助函数
// =========================================================

fn paper(title: &str, year: Option<i32>, provider: Provider) -> Paper {
    Paper {
        title: title.to_string(),
        year,
        ..Paper::new(provider)
    }
}

fn openalex_body() -> serde_json::Value {
    json!({
        "results": [{
            "id": "https://openalex.org/W1",
            "title": "Deep Learning for Diagnostics",
            "publication_year": 2021,
            "authorships": [
                {"author": {"display_name": "Jane Doe"}},
                {"author": null},
                {"author": {"display_name": "John Smith"}}
            ],
            "abstract_inverted_index": {"learning": [1, 3], "Deep": [0], "works": [2]},
            "primary_location": {"pdf_url": null, "landing_page_url": "https://doi.org/10.1/x"}
        }]
    })
}

fn crossref_body() -> serde_json::Value {
    json!({
        "status": "ok",
        "message": {
            "items": [{
                "title": ["Graph Methods in Medicine"],
                "author": [
                    {"given": "Ada ", "family": "Lovelace"},
                    {"name": "WHO Consortium"}
                ],
                "abstract": "<jats:p>Graphs <jats:italic>help</jats:italic>.</jats:p>",
                "issued": {"date-parts": [[2019, 4]]},
                "URL": "https://doi.org/10.2/y"
            }, {
                "title": [],
                "issued": {"date-parts": [[null]]}
            }]
        }
    })
}

fn semantic_body() -> serde_json::Value {
    json!({
        "total": 1,
        "data": [{
            "title": "deep learning for diagnostics",
            "abstract": null,
            "authors": [{"name": "Someone Else"}],
            "year": 2023,
            "openAccessPdf": {"url": "https://pdfs.example/z.pdf"},
            "url": "https://www.semanticscholar.org/paper/z"
        }, {
            "title": "Clinical Transformers",
            "authors": [],
            "year": null,
            "openAccessPdf": null,
            "url": "https://www.semanticscholar.org/paper/q"
        }]
    })
}

// =========================================================
// 纯函数
// =========================================================

#[test]
fn test_per_provider_limit_has_floor() {
    assert_eq!(per_provider_limit(1), 5);
    assert_eq!(per_provider_limit(10), 5);
    assert_eq!(per_provider_limit(20), 6);
    assert_eq!(per_provider_limit(50), 16);
}

#[test]
fn test_merge_dedupes_by_normalized_title_first_wins() {
    let merged = merge_results(
        vec![
            vec![paper("Same Title", Some(2020), Provider::OpenAlex)],
            vec![
                paper("  same title ", Some(2024), Provider::Crossref),
                paper("   ", Some(2025), Provider::Crossref),
            ],
        ],
        10,
    );
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].provider, Provider::OpenAlex);
}

#[test]
fn test_merge_sorts_by_year_desc_and_truncates() {
    let merged = merge_results(
        vec![vec![
            paper("A", None, Provider::OpenAlex),
            paper("B", Some(2018), Provider::OpenAlex),
            paper("C", Some(2022), Provider::OpenAlex),
            paper("D", Some(2018), Provider::OpenAlex),
        ]],
        3,
    );
    let titles: Vec<_> = merged.iter().map(|p| p.title.as_str()).collect();
    // 同年份保持原始顺序
    assert_eq!(titles, vec!["C", "B", "D"]);
}

#[test]
fn test_rebuild_abstract_orders_by_position() {
    let mut index = HashMap::new();
    index.insert("world".to_string(), vec![1]);
    index.insert("hello".to_string(), vec![0, 2]);
    assert_eq!(openalex::rebuild_abstract(&index), "hello world hello");
}

#[test]
fn test_strip_markup() {
    assert_eq!(
        crossref::strip_markup("<jats:p>Graphs <jats:italic>help</jats:italic>.</jats:p>"),
        "Graphs help."
    );
}

// =========================================================
// 数据源解析
// =========================================================

#[tokio::test]
async fn test_openalex_parses_works() {
    let client = MockHttpClient::new();
    client.mock_response(openalex::WORKS_URL, 200, openalex_body());

    let papers = openalex::search(&client, "deep learning", 6).await.unwrap();
    assert_eq!(papers.len(), 1);
    let p = &papers[0];
    assert_eq!(p.title, "Deep Learning for Diagnostics");
    assert_eq!(p.authors, vec!["Jane Doe", "John Smith"]);
    assert_eq!(p.abstract_text, "Deep learning works learning");
    assert_eq!(p.year, Some(2021));
    assert_eq!(p.url, "https://doi.org/10.1/x");

    let sent = client.requests_to(openalex::WORKS_URL);
    let url = sent[0].full_url().unwrap();
    assert!(url.contains("search=deep+learning"));
    assert!(url.contains("per_page=6"));
    assert!(url.contains("sort=publication_year%3Adesc"));
}

#[tokio::test]
async fn test_crossref_parses_items() {
    let client = MockHttpClient::new();
    client.mock_response(crossref::WORKS_URL, 200, crossref_body());

    let papers = crossref::search(&client, "graphs", 5).await.unwrap();
    assert_eq!(papers.len(), 2);
    assert_eq!(papers[0].title, "Graph Methods in Medicine");
    assert_eq!(papers[0].authors, vec!["Ada Lovelace", "WHO Consortium"]);
    assert_eq!(papers[0].abstract_text, "Graphs help.");
    assert_eq!(papers[0].year, Some(2019));
    assert_eq!(papers[0].url, "https://doi.org/10.2/y");
    assert_eq!(papers[1].title, "");
    assert_eq!(papers[1].year, None);
}

#[tokio::test]
async fn test_semantic_scholar_prefers_open_access_pdf() {
    let client = MockHttpClient::new();
    client.mock_response(semantic_scholar::SEARCH_URL, 200, semantic_body());

    let papers = semantic_scholar::search(&client, "transformers", 5).await.unwrap();
    assert_eq!(papers[0].url, "https://pdfs.example/z.pdf");
    assert_eq!(papers[0].abstract_text, "");
    assert_eq!(papers[1].url, "https://www.semanticscholar.org/paper/q");
    assert_eq!(papers[1].year, None);
}

#[tokio::test]
async fn test_provider_non_200_is_error() {
    let client = MockHttpClient::new();
    client.mock_text(crossref::WORKS_URL, 503, "busy");
    let err = crossref::search(&client, "x", 5).await.unwrap_err();
    assert_eq!(err.status_code(), 502);
}

// =========================================================
// 聚合检索
// =========================================================

#[tokio::test]
async fn test_search_merges_all_providers() {
    let client = MockHttpClient::new();
    client.mock_response(openalex::WORKS_URL, 200, openalex_body());
    client.mock_response(crossref::WORKS_URL, 200, crossref_body());
    client.mock_response(semantic_scholar::SEARCH_URL, 200, semantic_body());

    let papers = LiteratureSearch::new(&client).search("diagnostics", 20).await;
    let titles: Vec<_> = papers.iter().map(|p| p.title.as_str()).collect();
    // OpenAlex 的同名论文先到，Semantic Scholar 的重复被丢弃；无标题条目被丢弃
    assert_eq!(
        titles,
        vec![
            "Deep Learning for Diagnostics",
            "Graph Methods in Medicine",
            "Clinical Transformers"
        ]
    );
    assert_eq!(client.requests.borrow().len(), 3);
}

#[tokio::test]
async fn test_search_survives_provider_failures() {
    let client = MockHttpClient::new();
    client.mock_failure(openalex::WORKS_URL, "timeout");
    client.mock_text(crossref::WORKS_URL, 200, "not json");
    client.mock_response(semantic_scholar::SEARCH_URL, 200, semantic_body());

    let papers = LiteratureSearch::new(&client).search("diagnostics", 1).await;
    assert_eq!(papers.len(), 1);
    assert_eq!(papers[0].provider, Provider::SemanticScholar);
    assert_eq!(papers[0].year, Some(2023));
}

#[tokio::test]
async fn test_search_with_nothing_found() {
    let client = MockHttpClient::new();
    let papers = LiteratureSearch::new(&client).search("nothing", 20).await;
    assert!(papers.is_empty());
}
