//! Query construction: cleaning and domain-synonym expansion
//!
//! The raw question text is what users paste into the frontend, bracketed
//! headings and all. Cleaning runs before embedding; expansion is a
//! deliberately isolated step that can be switched off per deployment via
//! [`RetrievalConfig::expand_query`](crate::RetrievalConfig).

use std::sync::LazyLock;

use regex::Regex;

/// Half- and full-width brackets stripped from the outer edges of a question.
const EDGE_BRACKETS: &[char] = &[
    '(', ')', '[', ']', '{', '}', '（', '）', '［', '］', '｛', '｝', '「', '」', '『', '』', '【',
    '】',
];

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static whitespace pattern"));

/// Claims-document synonym terms appended to the cleaned query.
///
/// Dense embeddings under-weight boilerplate procedural vocabulary; appending
/// these terms trades a little precision for materially better recall on
/// "what documents do I need to file" style questions.
pub const EXPANSION_TERMS: &[&str] = &["보험금 청구", "구비서류", "제출 절차", "접수"];

/// Strip enclosing brackets from the outer edges and collapse internal
/// whitespace runs to a single space.
pub fn clean(raw: &str) -> String {
    let trimmed = raw
        .trim()
        .trim_matches(|c: char| c.is_whitespace() || EDGE_BRACKETS.contains(&c));
    WHITESPACE_RUN.replace_all(trimmed, " ").into_owned()
}

/// Append the fixed expansion terms to a cleaned query.
pub fn expand(cleaned: &str) -> String {
    if cleaned.is_empty() {
        return cleaned.to_string();
    }
    let mut out = String::with_capacity(cleaned.len() + 64);
    out.push_str(cleaned);
    for term in EXPANSION_TERMS {
        out.push(' ');
        out.push_str(term);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_strips_edge_brackets() {
        assert_eq!(clean("[실손 청구 서류]"), "실손 청구 서류");
        assert_eq!(clean("【보장 범위】"), "보장 범위");
        assert_eq!(clean("(질문) 입원비는?"), "질문) 입원비는?");
    }

    #[test]
    fn test_clean_collapses_whitespace() {
        assert_eq!(clean("  실손   청구\t서류  "), "실손 청구 서류");
        assert_eq!(clean("한  줄\n두 줄"), "한 줄 두 줄");
    }

    #[test]
    fn test_expand_appends_terms() {
        let expanded = expand("실손 청구 서류");
        assert!(expanded.starts_with("실손 청구 서류"));
        for term in EXPANSION_TERMS {
            assert!(expanded.contains(term));
        }
        assert_eq!(expand(""), "");
    }
}
