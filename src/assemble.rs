//! Bounded-context prompt assembly for the disk path.
//!
//! Reads each scouted file lazily, caps it at a fixed number of characters
//! to bound prompt size, and folds the blocks into one instruction prompt
//! for a single grounded QA call. The accessed files are always disclosed
//! back to the caller.

use crate::chat::{ChatClient, ChatMessage};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{DiskAnswer, ScoutMatch};
use crate::scout::DiskScout;

/// Answer the user's instruction from the scouted files. No matches is an
/// [`Error::EmptyResult`] carrying a hint to name the file explicitly.
pub async fn answer_from_files(
    query: &str,
    keyword: &str,
    matches: &[ScoutMatch],
    scout: &DiskScout,
    chat: &dyn ChatClient,
    config: &Config,
) -> Result<DiskAnswer> {
    if matches.is_empty() {
        return Err(Error::EmptyResult(format!(
            "no files found matching '{}'; try naming the file explicitly (e.g. \"check the notes file\")",
            keyword
        )));
    }

    let mut blocks = Vec::with_capacity(matches.len());
    for scout_match in matches {
        let content = scout.read_file_lazy(scout_match)?;
        let truncated = truncate_chars(&content, config.scout.max_file_chars);
        blocks.push(format!(
            "FILENAME: {}\nCONTENT: {}",
            scout_match.name, truncated
        ));
    }

    let messages = [
        ChatMessage::system(instruction_prompt(query, &blocks.join("\n\n"))),
        ChatMessage::user("Execute the instruction based on the files above."),
    ];
    let answer = chat.chat(&config.ollama.qa_model, &messages).await?;

    Ok(DiskAnswer {
        answer,
        keyword: keyword.to_string(),
        accessed: matches.to_vec(),
    })
}

fn instruction_prompt(query: &str, file_blocks: &str) -> String {
    format!(
        "You are a local file assistant. The user has asked a question about \
         these specific local files.\n\n\
         USER INSTRUCTION: {query}\n\n\
         FILES FOUND:\n{file_blocks}\n\n\
         Instructions:\n\
         - If the user asks to \"write the content\", output the file content verbatim.\n\
         - If the user asks for a summary, summarize with bullet points.\n\
         - Explicitly mention which file you are reading.",
        query = query,
        file_blocks = file_blocks,
    )
}

/// First `max` characters of `s`, on a char boundary.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((byte, _)) => &s[..byte],
        None => s,
    }
}
