use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use super::{Paper, Provider};
use crate::error::{ServiceError, ServiceResult};
use crate::utils::request::{HttpClient, HttpRequest};

pub const WORKS_URL: &str = "https://api.crossref.org/works";

static MARKUP_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<]+?>").unwrap());

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    message: Message,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Message {
    items: Vec<Item>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Item {
    title: Vec<String>,
    author: Vec<Contributor>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    issued: Option<DateParts>,
    #[serde(rename = "URL")]
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Contributor {
    given: Option<String>,
    family: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DateParts {
    #[serde(rename = "date-parts")]
    date_parts: Vec<Vec<Option<i32>>>,
}

pub async fn search<C: HttpClient>(client: &C, topic: &str, limit: usize) -> ServiceResult<Vec<Paper>> {
    let req = HttpRequest::get(WORKS_URL)
        .with_query("query", topic)
        .with_query("rows", limit)
        .with_query("sort", "issued")
        .with_query("order", "desc");

    let resp = client.send(req).await?;
    if resp.status != 200 {
        return Err(ServiceError::external_api(format!(
            "Crossref returned status {}",
            resp.status
        ))
        .in_op_with("crossref.search", topic));
    }

    let envelope: Envelope = resp.json().map_err(|e| e.in_op("crossref.decode"))?;
    Ok(envelope.message.items.into_iter().map(into_paper).collect())
}

fn into_paper(item: Item) -> Paper {
    let authors = item
        .author
        .into_iter()
        .map(|c| match c.name {
            Some(name) if c.given.is_none() && c.family.is_none() => name.trim().to_string(),
            _ => format!(
                "{} {}",
                c.given.as_deref().unwrap_or("").trim(),
                c.family.as_deref().unwrap_or("").trim()
            )
            .trim()
            .to_string(),
        })
        .filter(|s| !s.is_empty())
        .collect();

    Paper {
        title: item.title.into_iter().next().unwrap_or_default(),
        authors,
        abstract_text: item
            .abstract_text
            .map(|a| strip_markup(&a))
            .unwrap_or_default(),
        year: item
            .issued
            .and_then(|d| d.date_parts.into_iter().next())
            .and_then(|parts| parts.into_iter().next().flatten()),
        url: item.url.unwrap_or_default(),
        provider: Provider::Crossref,
    }
}

/// 去掉 JATS/XML 标签，如 `<jats:p>`
pub fn strip_markup(raw: &str) -> String {
    MARKUP_TAG.replace_all(raw, "").trim().to_string()
}
