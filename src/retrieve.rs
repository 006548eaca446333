//! Grounded retrieval over the upload index.
//!
//! Builds context from the top-k chunks, in rank order, and issues one
//! grounded QA call with a strict system prompt. The chunks used are
//! always returned for citation display. Model failure propagates
//! unrecovered — no retry, no silent empty answer.

use crate::chat::{ChatClient, ChatMessage};
use crate::config::Config;
use crate::embedding::EmbeddingClient;
use crate::error::{Error, Result};
use crate::index::VectorIndex;
use crate::models::UploadAnswer;

/// The exact refusal sentence the model must emit when the answer is not
/// present in the retrieved context.
pub const REFUSAL_SENTENCE: &str = "I cannot find this information in the provided files.";

const CONTEXT_DIVIDER: &str = "\n\n---\n\n";

fn system_prompt(context: &str) -> String {
    format!(
        "You are a secure local reasoning assistant.\n\
         STRICT RULES:\n\
         1. USE ONLY the provided context.\n\
         2. If the answer is NOT in the context, state exactly: \"{refusal}\"\n\
         3. Do NOT invent facts and do NOT use outside knowledge.\n\
         4. If the user asks to summarize, provide a structured summary with bullet points.\n\
         5. If the user asks to write content, reproduce the raw text verbatim.\n\n\
         CONTEXT FROM FILES:\n{context}",
        refusal = REFUSAL_SENTENCE,
        context = context,
    )
}

/// Answer a query against the session index. Requests `k = min(top_k, index
/// size)` chunks — never more than available. A missing or empty index is
/// an [`Error::EmptyResult`], not a crash.
pub async fn answer_question(
    query: &str,
    index: Option<&VectorIndex>,
    embedder: &dyn EmbeddingClient,
    chat: &dyn ChatClient,
    config: &Config,
) -> Result<UploadAnswer> {
    let index = index.filter(|ix| !ix.is_empty()).ok_or_else(|| {
        Error::EmptyResult("no documents indexed yet; upload and process a document first".into())
    })?;

    let k = config.retrieval.top_k.min(index.len());
    let query_embedding = embedder.embed(query).await?;
    let retrieved = index.search(&query_embedding, k);

    let context = retrieved
        .iter()
        .map(|r| r.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_DIVIDER);

    let messages = [
        ChatMessage::system(system_prompt(&context)),
        ChatMessage::user(query),
    ];
    let answer = chat.chat(&config.ollama.qa_model, &messages).await?;

    Ok(UploadAnswer {
        answer,
        sources: retrieved,
    })
}
