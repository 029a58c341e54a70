//! The Text Chunker: paragraph-aware, sentence-aware chunking with token
//! overlap (oversized paragraphs fall back to sentence splitting; a single
//! oversized sentence is emitted whole rather than cut; overlap is
//! recomputed from the *previous* chunk's trailing sentences once a new
//! chunk is closed) over a `tiktoken-rs` `cl100k_base` encoder.

use async_trait::async_trait;
use explorer_types::Chunk;
use std::sync::OnceLock;
use tiktoken_rs::CoreBPE;

/// Chunking strategy, kept as an async trait even though the underlying
/// algorithm is CPU-bound and synchronous, so callers can compose it
/// uniformly with the I/O-bound ports in `explorer_types::ports`.
#[async_trait]
pub trait ChunkingStrategy: Send + Sync {
    async fn chunk(&self, text: &str) -> Vec<Chunk>;
}

/// The paragraph/sentence/overlap chunker, sized by token count.
pub struct TextChunker {
    chunk_size: u32,
    overlap: u32,
}

impl TextChunker {
    pub fn new(chunk_size: u32, overlap: u32) -> Self {
        Self {
            chunk_size,
            overlap,
        }
    }
}

#[async_trait]
impl ChunkingStrategy for TextChunker {
    async fn chunk(&self, text: &str) -> Vec<Chunk> {
        let chunk_size = self.chunk_size;
        let overlap = self.overlap;
        let text = text.to_string();
        tokio::task::spawn_blocking(move || chunk_text(&text, chunk_size, overlap))
            .await
            .unwrap_or_default()
    }
}

fn encoder() -> &'static CoreBPE {
    static ENCODER: OnceLock<CoreBPE> = OnceLock::new();
    ENCODER.get_or_init(|| {
        tiktoken_rs::cl100k_base().expect("cl100k_base encoder data is bundled with tiktoken-rs")
    })
}

/// Count tokens in `text`, `0` for empty/whitespace-only input.
pub fn count_tokens(text: &str) -> u32 {
    if text.trim().is_empty() {
        return 0;
    }
    encoder().encode_with_special_tokens(text).len() as u32
}

fn split_by_paragraphs(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits on `[.!?]` followed by whitespace and an uppercase letter, the
/// same boundary rule a preceding sentence-splitter conventionally uses.
fn split_by_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0usize;
    let chars: Vec<(usize, char)> = text.char_indices().collect();

    for i in 0..chars.len() {
        let (byte_idx, ch) = chars[i];
        if matches!(ch, '.' | '!' | '?') {
            let mut j = i + 1;
            while j < chars.len() && chars[j].1.is_whitespace() {
                j += 1;
            }
            if j < chars.len() && j > i + 1 && chars[j].1.is_uppercase() {
                let end = byte_idx + ch.len_utf8();
                let sentence = text[start..end].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence.to_string());
                }
                start = chars[j].0;
            }
        }
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

fn add_overlap(previous_chunk: &str, current_chunk: &str, overlap: u32) -> (String, u32) {
    let previous_sentences = split_by_sentences(previous_chunk);
    let mut overlap_text = String::new();
    let mut overlap_tokens = 0u32;

    for sentence in previous_sentences.iter().rev() {
        let sentence_tokens = count_tokens(sentence);
        if overlap_tokens + sentence_tokens <= overlap {
            overlap_text = if overlap_text.is_empty() {
                sentence.clone()
            } else {
                format!("{sentence} {overlap_text}")
            };
            overlap_tokens += sentence_tokens;
        } else {
            break;
        }
    }

    let new_chunk = if overlap_text.is_empty() {
        current_chunk.to_string()
    } else {
        format!("{overlap_text} {current_chunk}")
    };
    let new_tokens = count_tokens(&new_chunk);
    (new_chunk, new_tokens)
}

/// The synchronous core of the Text Chunker.
pub fn chunk_text(text: &str, chunk_size: u32, overlap: u32) -> Vec<Chunk> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let whole_tokens = count_tokens(text);
    if whole_tokens <= chunk_size {
        let trimmed = text.trim().to_string();
        let tokens = count_tokens(&trimmed);
        return vec![Chunk::new(0, trimmed, tokens)];
    }

    let paragraphs = split_by_paragraphs(text);
    let mut chunks: Vec<Chunk> = Vec::new();
    let mut current_chunk = String::new();
    let mut current_tokens = 0u32;
    let mut chunk_id = 0u32;

    let mut close_chunk = |chunks: &mut Vec<Chunk>, text: String, tokens: u32, id: &mut u32| {
        if text.trim().is_empty() {
            return;
        }
        let (final_text, final_tokens) = match chunks.last() {
            Some(previous) => add_overlap(&previous.text, text.trim(), overlap),
            None => (text.trim().to_string(), tokens),
        };
        chunks.push(Chunk::new(*id, final_text, final_tokens));
        *id += 1;
    };

    for paragraph in paragraphs {
        let paragraph_tokens = count_tokens(&paragraph);

        if paragraph_tokens > chunk_size {
            for sentence in split_by_sentences(&paragraph) {
                let sentence_tokens = count_tokens(&sentence);
                if current_tokens + sentence_tokens <= chunk_size {
                    current_chunk = if current_chunk.is_empty() {
                        sentence
                    } else {
                        format!("{current_chunk} {sentence}")
                    };
                    current_tokens += sentence_tokens;
                } else {
                    close_chunk(
                        &mut chunks,
                        std::mem::take(&mut current_chunk),
                        current_tokens,
                        &mut chunk_id,
                    );
                    current_chunk = sentence;
                    current_tokens = sentence_tokens;
                }
            }
            close_chunk(
                &mut chunks,
                std::mem::take(&mut current_chunk),
                current_tokens,
                &mut chunk_id,
            );
            current_tokens = 0;
        } else if paragraph_tokens + current_tokens <= chunk_size {
            current_chunk = if current_chunk.is_empty() {
                paragraph
            } else {
                format!("{current_chunk}\n\n{paragraph}")
            };
            current_tokens += paragraph_tokens;
        } else {
            close_chunk(
                &mut chunks,
                std::mem::take(&mut current_chunk),
                current_tokens,
                &mut chunk_id,
            );
            current_chunk = paragraph;
            current_tokens = paragraph_tokens;
        }
    }

    close_chunk(&mut chunks, current_chunk, current_tokens, &mut chunk_id);
    chunks
}
