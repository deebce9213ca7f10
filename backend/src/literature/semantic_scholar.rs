use serde::Deserialize;

use super::{Paper, Provider};
use crate::error::{ServiceError, ServiceResult};
use crate::utils::request::{HttpClient, HttpRequest};

pub const SEARCH_URL: &str = "https://api.semanticscholar.org/graph/v1/paper/search";
const FIELDS: &str = "title,abstract,authors,year,openAccessPdf,url";

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    data: Vec<Record>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Record {
    title: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    authors: Vec<Author>,
    year: Option<i32>,
    open_access_pdf: Option<Pdf>,
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Author {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Pdf {
    url: Option<String>,
}

pub async fn search<C: HttpClient>(client: &C, topic: &str, limit: usize) -> ServiceResult<Vec<Paper>> {
    let req = HttpRequest::get(SEARCH_URL)
        .with_query("query", topic)
        .with_query("limit", limit)
        .with_query("fields", FIELDS);

    let resp = client.send(req).await?;
    if resp.status != 200 {
        return Err(ServiceError::external_api(format!(
            "Semantic Scholar returned status {}",
            resp.status
        ))
        .in_op_with("semantic_scholar.search", topic));
    }

    let page: SearchPage = resp.json().map_err(|e| e.in_op("semantic_scholar.decode"))?;
    Ok(page.data.into_iter().map(into_paper).collect())
}

fn into_paper(record: Record) -> Paper {
    Paper {
        title: record.title.unwrap_or_default(),
        authors: record.authors.into_iter().filter_map(|a| a.name).collect(),
        abstract_text: record.abstract_text.unwrap_or_default(),
        year: record.year,
        url: record
            .open_access_pdf
            .and_then(|p| p.url)
            .filter(|u| !u.is_empty())
            .or(record.url)
            .unwrap_or_default(),
        provider: Provider::SemanticScholar,
    }
}
