use crate::facts::FactRecord;
use crate::keyword::KeywordIndex;
use crate::passage::SourceTag;
use counselor_core::{CounselorError, CounselorResult};
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

/// Target chunk size for free-text documents, in characters.
const CHUNK_SIZE: usize = 1000;
/// Overlap carried between adjacent chunks, in characters.
const CHUNK_OVERLAP: usize = 200;

/// Build a [`KeywordIndex`] from a data directory.
///
/// `*.json` files are treated as structured-fact sources: a top-level array
/// (or an object whose `records` field is an array) yields one passage per
/// record; any other JSON shape is rendered as a single record. `*.txt` and
/// `*.md` files are chunked into overlapping passages. Unreadable files are
/// logged and skipped; an unreadable directory is an error.
pub async fn build_index(data_dir: &Path) -> CounselorResult<KeywordIndex> {
    let index = KeywordIndex::new();

    let mut entries = tokio::fs::read_dir(data_dir).await.map_err(|e| {
        CounselorError::Config(format!(
            "Cannot read data directory {}: {e}",
            data_dir.display()
        ))
    })?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        match ext {
            "json" => match tokio::fs::read_to_string(&path).await {
                Ok(raw) => match serde_json::from_str::<Value>(&raw) {
                    Ok(value) => {
                        let count = index_fact_file(&index, value).await;
                        info!(file = %path.display(), passages = count, "Indexed fact file");
                    }
                    Err(e) => {
                        warn!(file = %path.display(), error = %e, "Skipping malformed JSON file");
                    }
                },
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Skipping unreadable file");
                }
            },
            "txt" | "md" => match tokio::fs::read_to_string(&path).await {
                Ok(text) => {
                    let chunks = chunk_text(&text, CHUNK_SIZE, CHUNK_OVERLAP);
                    let count = chunks.len();
                    for chunk in chunks {
                        index.insert(chunk, SourceTag::Document).await;
                    }
                    info!(file = %path.display(), passages = count, "Indexed document");
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Skipping unreadable file");
                }
            },
            _ => {}
        }
    }

    info!(passages = index.len().await, "Knowledge index built");
    Ok(index)
}

/// Index one parsed JSON value, returning the number of passages added.
async fn index_fact_file(index: &KeywordIndex, value: Value) -> usize {
    let records: Vec<Value> = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("records") {
            Some(Value::Array(items)) => items,
            _ => vec![Value::Object(map)],
        },
        other => vec![other],
    };

    let mut count = 0;
    for record in records {
        let text = FactRecord::from_value(record).to_passage_text();
        if text.trim().is_empty() {
            continue;
        }
        index.insert(text, SourceTag::Fact).await;
        count += 1;
    }
    count
}

/// Split free text into chunks of roughly `chunk_size` characters, preferring
/// paragraph boundaries and carrying `overlap` trailing characters into the
/// next chunk.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
        if !current.is_empty() && current.len() + paragraph.len() + 2 > chunk_size {
            flush_chunk(&mut chunks, &mut current, overlap);
        }
        if paragraph.len() > chunk_size {
            // Oversized paragraph: sliding window on char boundaries, the
            // windows themselves provide the overlap. `current` can only hold
            // the already-emitted overlap tail here, so it is dropped.
            current.clear();
            let chars: Vec<char> = paragraph.chars().collect();
            let step = chunk_size.saturating_sub(overlap).max(1);
            let mut start = 0;
            while start < chars.len() {
                let end = (start + chunk_size).min(chars.len());
                chunks.push(chars[start..end].iter().collect());
                if end == chars.len() {
                    break;
                }
                start += step;
            }
        } else {
            if !current.is_empty() {
                current.push_str("\n\n");
            }
            current.push_str(paragraph);
        }
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
    chunks
}

fn flush_chunk(chunks: &mut Vec<String>, current: &mut String, overlap: usize) {
    let chunk = current.trim().to_string();
    if chunk.is_empty() {
        current.clear();
        return;
    }
    let tail: String = tail_chars(&chunk, overlap);
    chunks.push(chunk);
    *current = tail;
}

/// The last `max_chars` characters of `s`, on a char boundary.
fn tail_chars(s: &str, max_chars: usize) -> String {
    let count = s.chars().count();
    if count <= max_chars {
        return s.to_string();
    }
    s.chars().skip(count - max_chars).collect()
}
