use std::collections::HashMap;

use serde::Deserialize;

use super::{Paper, Provider};
use crate::error::{ServiceError, ServiceResult};
use crate::utils::request::{HttpClient, HttpRequest};

pub const WORKS_URL: &str = "https://api.openalex.org/works";

#[derive(Debug, Deserialize)]
struct WorksPage {
    #[serde(default)]
    results: Vec<Work>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Work {
    id: Option<String>,
    title: Option<String>,
    display_name: Option<String>,
    publication_year: Option<i32>,
    authorships: Vec<Authorship>,
    abstract_inverted_index: Option<HashMap<String, Vec<usize>>>,
    primary_location: Option<Location>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Authorship {
    author: Option<Author>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Author {
    display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Location {
    pdf_url: Option<String>,
    landing_page_url: Option<String>,
    source: Option<HostSource>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HostSource {
    host_page_url: Option<String>,
}

pub async fn search<C: HttpClient>(client: &C, topic: &str, limit: usize) -> ServiceResult<Vec<Paper>> {
    let req = HttpRequest::get(WORKS_URL)
        .with_query("search", topic)
        .with_query("per_page", limit)
        .with_query("sort", "publication_year:desc");

    let resp = client.send(req).await?;
    if resp.status != 200 {
        return Err(ServiceError::external_api(format!(
            "OpenAlex returned status {}",
            resp.status
        ))
        .in_op_with("openalex.search", topic));
    }

    let page: WorksPage = resp.json().map_err(|e| e.in_op("openalex.decode"))?;
    Ok(page.results.into_iter().map(into_paper).collect())
}

fn into_paper(work: Work) -> Paper {
    let location = work.primary_location.unwrap_or_default();
    let url = location
        .pdf_url
        .or(location.landing_page_url)
        .or(location.source.and_then(|s| s.host_page_url))
        .or(work.id)
        .unwrap_or_default();

    Paper {
        title: work.title.or(work.display_name).unwrap_or_default(),
        authors: work
            .authorships
            .into_iter()
            .filter_map(|a| a.author.and_then(|a| a.display_name))
            .collect(),
        abstract_text: work
            .abstract_inverted_index
            .map(|index| rebuild_abstract(&index))
            .unwrap_or_default(),
        year: work.publication_year,
        url,
        provider: Provider::OpenAlex,
    }
}

/// 倒排索引 `{word: [positions]}` 还原为正文
pub fn rebuild_abstract(index: &HashMap<String, Vec<usize>>) -> String {
    let mut positioned: Vec<(usize, &str)> = index
        .iter()
        .flat_map(|(word, positions)| positions.iter().map(move |p| (*p, word.as_str())))
        .collect();
    positioned.sort_by_key(|(pos, _)| *pos);
    positioned
        .into_iter()
        .map(|(_, word)| word)
        .collect::<Vec<_>>()
        .join(" ")
}
