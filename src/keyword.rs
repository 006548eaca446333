//! File-search keyword extraction.
//!
//! Turns a free-form query into a single bare keyword guessing the filename
//! or topic the user is after ("show me the budget" → "budget") via one
//! call to the lighter model. This is the only component with a local
//! recovery policy: on any failure of the underlying call it returns the
//! original query unchanged instead of propagating.

use crate::chat::{ChatClient, ChatMessage};
use crate::config::Config;

/// Returned for a whitespace-only query so the result is never empty; it
/// matches nothing during scouting.
const FALLBACK_KEYWORD: &str = "*";

const EXTRACTOR_PROMPT: &str = "You are a search query extractor.\n\
    Extract the single most likely FILENAME keyword or TOPIC from the user's request.\n\n\
    Rules:\n\
    - Return ONLY the keyword.\n\
    - No explanations.\n\
    - If the user asks \"Show me the budget\", return \"budget\".\n\
    - If the user asks \"Read the file named data.csv\", return \"data\".";

/// Never fails and never returns an empty string.
pub async fn extract(query: &str, chat: &dyn ChatClient, config: &Config) -> String {
    let messages = [
        ChatMessage::system(EXTRACTOR_PROMPT),
        ChatMessage::user(query),
    ];

    let keyword = match chat.chat(&config.ollama.keyword_model, &messages).await {
        Ok(raw) => {
            let cleaned = clean_response(&raw);
            if cleaned.is_empty() {
                query.trim().to_string()
            } else {
                cleaned
            }
        }
        Err(_) => query.trim().to_string(),
    };

    if keyword.is_empty() {
        FALLBACK_KEYWORD.to_string()
    } else {
        keyword
    }
}

/// Models pad keyword answers with whitespace and quotes; strip both.
fn clean_response(raw: &str) -> String {
    raw.replace(['"', '\''], "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_quotes_and_whitespace() {
        assert_eq!(clean_response("  \"budget\" \n"), "budget");
        assert_eq!(clean_response("'solar'"), "solar");
        assert_eq!(clean_response("plain"), "plain");
    }

    #[test]
    fn quote_only_response_cleans_to_empty() {
        assert_eq!(clean_response(" \"\" "), "");
    }
}
