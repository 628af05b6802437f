//! Keyword rerank bonus
//!
//! Dense embeddings under-weight rare but operationally critical claims
//! vocabulary (진단서, 영수증, ...). Each distinct keyword present in a
//! chunk adds a small fixed bonus on top of the vector similarity. The
//! multiplier is a tunable default, sized so that similarity ordering still
//! dominates whenever keyword counts are equal.

/// Claims-process terms that mark a chunk as procedurally relevant.
pub const CLAIM_KEYWORDS: &[&str] = &[
    "청구", "보험금", "서류", "진단서", "접수", "지급", "입원", "수술", "영수증", "심사", "제출",
    "확인서", "면책", "보장",
];

/// Bonus per matched keyword. Ad hoc but documented: at 0.03, four distinct
/// keyword hits are worth roughly one rank step between close neighbors.
pub const DEFAULT_KEYWORD_BONUS: f32 = 0.03;

/// Number of distinct keywords occurring in `text` (substring match).
pub fn keyword_hits(text: &str) -> usize {
    CLAIM_KEYWORDS.iter().copied().filter(|kw| text.contains(kw)).count()
}

/// The additive rerank bonus for a chunk's text.
pub fn bonus(text: &str, per_keyword: f32) -> f32 {
    keyword_hits(text) as f32 * per_keyword
}
