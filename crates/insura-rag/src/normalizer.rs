//! Insurer name normalization
//!
//! Document categories are free text at write time: ETL folder names, English
//! and Korean spellings, abbreviations. All comparisons in the retrieval
//! pipeline go through [`normalize_insurer`] first, so "DB손해" and
//! "동부화재" land in the same bucket. Unrecognized names pass through
//! trimmed rather than failing: normalization is total and never raises.

use std::sync::LazyLock;

use regex::Regex;

/// The universal category for standard-form documents that apply to every
/// insurer. Treated as an always-eligible fallback pool by the retrieval
/// engine, never as an ordinary insurer.
pub const COMMON_CATEGORY: &str = "공통";

static ALIASES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)현대\s*해상|\bHI\b", "현대해상"),
        (r"(?i)DB\s*손해|DB\s*Insurance|동부\s*화재", "DB손해보험"),
        (r"(?i)삼성\s*화재|Samsung\s*Fire", "삼성화재"),
        (r"(?i)공통|공용|표준\s*약관|\bcommon\b", COMMON_CATEGORY),
    ]
    .into_iter()
    .map(|(pattern, canon)| (Regex::new(pattern).expect("static alias pattern"), canon))
    .collect()
});

/// Map a free-text insurer/category label to its canonical form.
///
/// Returns `None` for empty/absent input. Unmatched input comes back
/// whitespace-trimmed but otherwise unchanged.
pub fn normalize_insurer(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    for (pattern, canon) in ALIASES.iter() {
        if pattern.is_match(trimmed) {
            return Some((*canon).to_string());
        }
    }
    Some(trimmed.to_string())
}

/// Raw spellings recorded in the corpus for a canonical category.
///
/// For stores whose category filter is exact-match rather than regex (the
/// Qdrant pushdown). Every listed spelling normalizes back to its canonical
/// form; an unknown canonical has no recorded variants and returns the
/// empty slice.
pub fn alias_variants(canonical: &str) -> &'static [&'static str] {
    match canonical {
        "현대해상" => &["현대해상", "현대 해상", "HI", "hi"],
        "DB손해보험" => {
            &["DB손해보험", "DB손해", "DB 손해", "DB Insurance", "동부화재", "동부 화재"]
        }
        "삼성화재" => &["삼성화재", "삼성 화재", "Samsung Fire"],
        COMMON_CATEGORY => &[COMMON_CATEGORY, "공용", "표준약관", "표준 약관", "common"],
        _ => &[],
    }
}

/// Whether a normalized category is the universal 공통 bucket.
pub fn is_common(normalized: &str) -> bool {
    normalized == COMMON_CATEGORY
}
