//! Overlapping, offset-tagged text chunker.
//!
//! Splits a normalized document's text into chunks targeting a fixed
//! character budget with a fixed overlap between consecutive chunks of the
//! same document. Chunk boundaries snap backward from the budget ceiling to
//! the best separator available — paragraph break, then line break, then
//! word break — so chunks keep semantic edges where possible.
//!
//! All arithmetic is in characters, not bytes, so multi-byte text never
//! splits mid-codepoint. Guarantees, per document: offsets are
//! non-decreasing, chunks cover the source text, every chunk except
//! possibly the last is at most `chunk_chars` long, and consecutive chunks
//! overlap by exactly `overlap_chars` characters.

use crate::models::{Chunk, NormalizedDocument};

/// Separator hierarchy, strongest boundary first.
const SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];

/// Chunk every document; chunks never span document boundaries.
/// Documents with blank text produce no chunks.
pub fn chunk_documents(
    docs: &[NormalizedDocument],
    chunk_chars: usize,
    overlap_chars: usize,
) -> Vec<Chunk> {
    docs.iter()
        .flat_map(|doc| chunk_document(doc, chunk_chars, overlap_chars))
        .collect()
}

/// Split one document. `overlap_chars` must be < `chunk_chars` (enforced by
/// config validation) so every step makes forward progress.
pub fn chunk_document(
    doc: &NormalizedDocument,
    chunk_chars: usize,
    overlap_chars: usize,
) -> Vec<Chunk> {
    let text = doc.text.as_str();
    if text.trim().is_empty() {
        return Vec::new();
    }

    // Byte offset of every character boundary, plus the terminal one.
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(b, _)| b)
        .chain(std::iter::once(text.len()))
        .collect();
    let total_chars = bounds.len() - 1;

    let mut chunks = Vec::new();
    let mut start = 0usize; // in characters

    loop {
        let hard_end = (start + chunk_chars).min(total_chars);
        let end = if hard_end == total_chars {
            total_chars
        } else {
            let window = &text[bounds[start]..bounds[hard_end]];
            // The next chunk starts overlap_chars before this end, so the
            // snapped end must advance past start + overlap_chars.
            snap_to_separator(window, overlap_chars + 1)
                .map(|chars| start + chars)
                .unwrap_or(hard_end)
        };

        chunks.push(Chunk {
            text: text[bounds[start]..bounds[end]].to_string(),
            start_offset: start,
            source: doc.source.clone(),
        });

        if end == total_chars {
            break;
        }
        start = end - overlap_chars;
    }

    chunks
}

/// Character count of the window up to (and including) the last occurrence
/// of the strongest separator that still leaves at least `min_advance`
/// characters in the chunk. `None` means hard-cut at the window edge.
fn snap_to_separator(window: &str, min_advance: usize) -> Option<usize> {
    for sep in SEPARATORS {
        if let Some(byte_pos) = window.rfind(sep) {
            let cut = byte_pos + sep.len();
            let chars = window[..cut].chars().count();
            if chars >= min_advance {
                return Some(chars);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> NormalizedDocument {
        NormalizedDocument {
            text: text.to_string(),
            source: "test.txt".to_string(),
        }
    }

    fn long_text() -> String {
        (0..120)
            .map(|i| format!("Paragraph number {} with a little bit of filler text.", i))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    #[test]
    fn small_text_is_a_single_chunk() {
        let chunks = chunk_document(&doc("Hello, world!"), 1500, 150);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].start_offset, 0);
        assert_eq!(chunks[0].text, "Hello, world!");
        assert_eq!(chunks[0].source, "test.txt");
    }

    #[test]
    fn blank_text_produces_no_chunks() {
        assert!(chunk_document(&doc("   \n\n  "), 1500, 150).is_empty());
    }

    #[test]
    fn chunk_length_capped_and_overlap_exact() {
        let text = long_text();
        let chunks = chunk_document(&doc(&text), 1500, 150);
        assert!(chunks.len() > 1);

        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 1500);
        }
        for pair in chunks.windows(2) {
            let prev_end = pair[0].start_offset + pair[0].text.chars().count();
            assert_eq!(pair[1].start_offset, prev_end - 150);
        }
    }

    #[test]
    fn offsets_are_nondecreasing_and_cover_the_text() {
        let text = long_text();
        let chunks = chunk_document(&doc(&text), 1500, 150);

        let mut covered_to = 0usize;
        let mut last_start = 0usize;
        for chunk in &chunks {
            assert!(chunk.start_offset >= last_start);
            assert!(chunk.start_offset <= covered_to, "gap before chunk");
            last_start = chunk.start_offset;
            covered_to = covered_to.max(chunk.start_offset + chunk.text.chars().count());
        }
        assert_eq!(covered_to, text.chars().count());
    }

    #[test]
    fn offsets_slice_back_to_the_source() {
        let text = long_text();
        let chunks = chunk_document(&doc(&text), 1500, 150);
        let chars: Vec<char> = text.chars().collect();
        for chunk in &chunks {
            let expected: String = chars
                [chunk.start_offset..chunk.start_offset + chunk.text.chars().count()]
                .iter()
                .collect();
            assert_eq!(chunk.text, expected);
        }
    }

    #[test]
    fn prefers_paragraph_boundaries() {
        let text = format!("{}\n\n{}", "a".repeat(800), "b".repeat(800));
        let chunks = chunk_document(&doc(&text), 1500, 150);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].text.ends_with("\n\n"));
    }

    #[test]
    fn multibyte_text_never_splits_codepoints() {
        let text = "héllo wörld ".repeat(400);
        let chunks = chunk_document(&doc(&text), 1500, 150);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let prev_end = pair[0].start_offset + pair[0].text.chars().count();
            assert_eq!(pair[1].start_offset, prev_end - 150);
        }
    }

    #[test]
    fn unbreakable_run_is_hard_cut() {
        let text = "x".repeat(4000);
        let chunks = chunk_document(&doc(&text), 1500, 150);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 1500);
        }
    }

    #[test]
    fn chunks_never_cross_documents() {
        let docs = vec![doc(&long_text()), doc("short trailing doc")];
        let chunks = chunk_documents(&docs, 1500, 150);
        let short: Vec<_> = chunks
            .iter()
            .filter(|c| c.text.contains("short trailing doc"))
            .collect();
        assert_eq!(short.len(), 1);
        assert_eq!(short[0].start_offset, 0);
    }
}
