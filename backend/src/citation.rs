//! APA 7 风格的参考文献列表

use litreview_shared::Source;

pub const REFERENCES_HEADING: &str = "References (APA)";

/// `Jane Q Doe` → `Doe, J.Q.`；单个词原样返回
pub fn format_author(name: &str) -> String {
    let parts: Vec<&str> = name.split_whitespace().collect();
    let Some((surname, given)) = parts.split_last() else {
        return name.to_string();
    };
    let initials: String = given
        .iter()
        .filter_map(|p| p.chars().next())
        .map(|c| format!("{}.", c.to_uppercase()))
        .collect();
    if initials.is_empty() {
        surname.to_string()
    } else {
        format!("{}, {}", surname, initials)
    }
}

/// 一位作者原样；两位用 `&` 连接；三位及以上 `A, B, & C`
pub fn format_author_list(authors: &[String]) -> String {
    let formatted: Vec<String> = authors.iter().map(|a| format_author(a)).collect();
    match formatted.as_slice() {
        [] => "Author".to_string(),
        [only] => only.clone(),
        [first, second] => format!("{} & {}", first, second),
        [init @ .., last] => format!("{}, & {}", init.join(", "), last),
    }
}

pub fn reference_line(source: &Source) -> String {
    let year = source
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "n.d.".to_string());
    let title = source.title.trim().trim_end_matches('.');
    let title = if title.is_empty() { "Untitled" } else { title };

    format!(
        "{} ({}). {}. {}",
        format_author_list(&source.authors),
        year,
        title,
        source.url
    )
    .trim()
    .to_string()
}

/// 追加在综述正文之后的参考文献块；没有来源时返回 None
pub fn references_block(sources: &[Source]) -> Option<String> {
    if sources.is_empty() {
        return None;
    }
    let lines: Vec<String> = sources
        .iter()
        .map(|s| format!("- {}", reference_line(s)))
        .collect();
    Some(format!("\n\n{}\n{}", REFERENCES_HEADING, lines.join("\n")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(title: &str, authors: &[&str], year: Option<i32>, url: &str) -> Source {
        Source {
            title: title.to_string(),
            authors: authors.iter().map(|a| a.to_string()).collect(),
            year,
            url: url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_format_author() {
        assert_eq!(format_author("Jane Doe"), "Doe, J.");
        assert_eq!(format_author("jane quinn doe"), "doe, J.Q.");
        assert_eq!(format_author("Plato"), "Plato");
        assert_eq!(format_author("  "), "  ");
    }

    #[test]
    fn test_author_list_joining() {
        let names = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(format_author_list(&[]), "Author");
        assert_eq!(format_author_list(&names(&["Ada Lovelace"])), "Lovelace, A.");
        assert_eq!(
            format_author_list(&names(&["Ada Lovelace", "Alan Turing"])),
            "Lovelace, A. & Turing, A."
        );
        assert_eq!(
            format_author_list(&names(&["Ada Lovelace", "Alan Turing", "Grace Hopper"])),
            "Lovelace, A., Turing, A., & Hopper, G."
        );
    }

    #[test]
    fn test_reference_line_fallbacks() {
        assert_eq!(
            reference_line(&source("Graphs.", &["Ada Lovelace"], Some(2019), "https://x")),
            "Lovelace, A. (2019). Graphs. https://x"
        );
        assert_eq!(reference_line(&source("", &[], None, "")), "Author (n.d.). Untitled.");
    }

    #[test]
    fn test_references_block() {
        assert_eq!(references_block(&[]), None);
        let block = references_block(&[
            source("A", &["X Y"], Some(2020), "u1"),
            source("B", &[], None, "u2"),
        ])
        .unwrap();
        assert_eq!(
            block,
            "\n\nReferences (APA)\n- Y, X. (2020). A. u1\n- Author (n.d.). B. u2"
        );
    }
}
