use std::fmt::Write;

use litreview_shared::{DEFAULT_FIELD, ReviewLength};

use crate::literature::Paper;

/// 进入 prompt 的论文数量上限
pub const PROMPT_PAPER_LIMIT: usize = 10;

pub const SYSTEM_PROMPT: &str = "You are an expert academic researcher and literature review specialist. Your task is to:

1. Analyze research topics and objectives to identify key themes
2. Search for relevant academic literature
3. Synthesize findings into comprehensive literature reviews
4. Maintain academic standards with proper citations

When generating literature reviews:
- Structure them with clear sections (Introduction, Methodology, Findings, Discussion, Conclusion)
- Include in-text citations where appropriate (Author, Year)
- Maintain academic tone and rigor
- Highlight gaps in current research
- Provide critical analysis of existing literature
- Write well-developed paragraphs, not bullet points
- Ensure paragraphs are coherent, focused, and use clear transitions between ideas

Format in-text citations as: (Author, Year) or Author (Year) depending on context.";

const SECTIONS: [&str; 5] = [
    "Introduction and Background",
    "Current State of Research",
    "Key Findings and Trends (map to objectives if available)",
    "Research Gaps and Future Directions",
    "Conclusion",
];

fn length_guide(length: ReviewLength) -> &'static str {
    match length {
        ReviewLength::Brief => "write one focused paragraph",
        ReviewLength::Standard => "write around two solid paragraphs",
        ReviewLength::Comprehensive => "write around three substantial paragraphs",
    }
}

fn format_paper(out: &mut String, index: usize, paper: &Paper) {
    let published = paper
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let _ = write!(
        out,
        "\nPaper {} ({}):\nTitle: {}\nAuthors: {}\nAbstract: {}\nPublished: {}\nURL: {}\n",
        index,
        paper.provider.label(),
        paper.title,
        paper.authors.join(", "),
        paper.abstract_text,
        published,
        paper.url
    );
}

pub fn analysis_prompt(
    topic: &str,
    field: &str,
    objectives: Option<&str>,
    papers: &[Paper],
    length: ReviewLength,
) -> String {
    let mut out = format!("Topic: {}\n", topic);
    if !field.trim().is_empty() && !field.eq_ignore_ascii_case(DEFAULT_FIELD) {
        let _ = writeln!(out, "Field: {}", field.trim());
    }
    if let Some(objectives) = objectives {
        let _ = write!(out, "\nResearch Objectives to address:\n{}\n", objectives);
    }

    out.push_str(
        "\nBased on the following academic papers collected from multiple platforms \
         (OpenAlex, Crossref, Semantic Scholar), generate a detailed literature review \
         that explicitly addresses the objectives where provided.\n",
    );

    for (i, paper) in papers.iter().take(PROMPT_PAPER_LIMIT).enumerate() {
        format_paper(&mut out, i + 1, paper);
    }

    let _ = write!(
        out,
        "\nPlease structure the literature review with the following sections, and for EACH section {} of analysis and synthesis (not bullet points):\n",
        length_guide(length)
    );
    for (i, section) in SECTIONS.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, section);
    }
    out.push_str(
        "\nUse an academic tone with appropriate in-text citations (Author, Year). \
         Ensure each paragraph is well-developed, with clear topic sentences, supporting \
         evidence, and explanatory commentary.",
    );
    out
}
