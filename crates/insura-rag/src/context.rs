//! Context formatting: ranked chunks → grounding text for the LLM prompt
//!
//! Two consumers: the prompt builder (numbered evidence blocks with metadata
//! headers) and the UI citation list (built by the server layer from the same
//! `ScoredChunk`s). The block separator is a fixed multi-line marker chosen
//! so that `split_context(build_context(chunks))` always recovers the
//! original ordered blocks.

use insura_core::ScoredChunk;

/// Separator between formatted chunk blocks. Multi-line on purpose: plain
/// policy text never contains a lone `=====` line.
pub const BLOCK_SEPARATOR: &str = "\n\n=====\n\n";

/// Per-block character cap inside the prompt, matching the ingestion chunk
/// ceiling. Keeps a pathological chunk from eating the whole token budget.
const MAX_BLOCK_CHARS: usize = 2000;

/// System role for the answer model.
pub const SYSTEM_PROMPT: &str =
    "당신은 보험 문서 안내 전문가입니다. 반드시 제공된 근거(context) 범위 내에서만 답하세요. \
     근거가 없으면 '제공된 근거 범위에서 확인되지 않습니다'라고 답하세요.";

/// Render one chunk as a labeled block: `(<file> p.<page>) [clause]\ncontent`.
pub fn format_block(scored: &ScoredChunk) -> String {
    let chunk = &scored.chunk;
    let source = match chunk.file_name.as_deref() {
        Some(name) => name.to_string(),
        None => format!("doc-{}", chunk.doc_id),
    };
    let mut header = match chunk.page {
        Some(page) => format!("({source} p.{page})"),
        None => format!("({source})"),
    };
    if let Some(title) = chunk.clause_title.as_deref() {
        header.push_str(&format!(" [{title}]"));
    }
    format!("{header}\n{}", chunk.content)
}

/// Join formatted blocks with [`BLOCK_SEPARATOR`].
pub fn build_context(chunks: &[ScoredChunk]) -> String {
    chunks.iter().map(format_block).collect::<Vec<_>>().join(BLOCK_SEPARATOR)
}

/// Re-split a joined context back into its ordered blocks.
pub fn split_context(context: &str) -> Vec<&str> {
    if context.is_empty() {
        return Vec::new();
    }
    context.split(BLOCK_SEPARATOR).collect()
}

/// Build the grounding prompt handed to the chat model.
///
/// Evidence blocks are numbered so the model can cite them back as
/// `근거 출처 [번호]`; each header carries the doc/chunk identifiers and the
/// final score for traceability.
pub fn build_prompt(question: &str, chunks: &[ScoredChunk]) -> String {
    let mut evidence = String::new();
    for (i, scored) in chunks.iter().enumerate() {
        let chunk = &scored.chunk;
        let mut meta = vec![format!("doc_id={}", chunk.doc_id), format!("chunk_id={}", chunk.chunk_id)];
        if let Some(title) = chunk.clause_title.as_deref() {
            meta.push(format!("clause={title}"));
        }
        let body: String = chunk.content.chars().take(MAX_BLOCK_CHARS).collect();
        evidence.push_str(&format!(
            "[{}] ({}) score={:.3}\n{}\n",
            i + 1,
            meta.join(", "),
            scored.score,
            body
        ));
    }

    let instructions = "아래 '근거'만을 사용해 사용자 질문에 답하세요.\n\
         - 근거에 없는 내용은 추론하지 말고 '제공된 근거 범위에서 확인되지 않습니다'라고 답하세요.\n\
         - 자동차/실손/화재 등 보험별 용어를 정확히 쓰세요.\n\
         - 필요서류는 발급기관까지 명시하세요.\n\
         - 마지막에 '근거 출처'로 [번호]를 나열하세요.\n";

    format!("[지시]\n{instructions}\n[질문]\n{question}\n\n[근거]\n{evidence}")
}
