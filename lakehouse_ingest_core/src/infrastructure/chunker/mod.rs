// /////////////////////////////////////////////////////////////////////////////
// Lakehouse Ingest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Structure-aware text chunking: paragraph/sentence splitting for prose,
//! header-carrying row grouping for tabular text, definition-boundary
//! splitting for code, and line-based grouping for structured markup.

use lakehouse_ingest_domain::entities::Chunk;
use lakehouse_ingest_domain::error::IngestionError;
use lakehouse_ingest_domain::services::ChunkerService;
use regex::Regex;
use std::sync::OnceLock;

/// Tuning knobs for [`SmartChunker`]. Defaults mirror the sizes the
/// classifier and embedder were tuned against - changing them changes
/// downstream embedding quality, not just chunk count.
#[derive(Debug, Clone, Copy)]
pub struct ChunkConfig {
    pub max_chunk_size: usize,
    pub min_chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 1000,
            min_chunk_size: 100,
            overlap: 100,
        }
    }
}

const TABULAR_EXTENSIONS: &[&str] = &[".csv", ".tsv", ".xlsx", ".xls"];
const CODE_EXTENSIONS: &[&str] = &[".py", ".js", ".ts", ".java", ".cpp", ".c"];
const STRUCTURED_EXTENSIONS: &[&str] = &[".json", ".xml", ".html"];

/// `true` for an uppercase Latin letter or the German uppercase umlauts -
/// the characters the original sentence splitter treats as "next sentence
/// starts here". The `regex` crate has no lookaround support, so boundary
/// detection is a manual char scan rather than a lookaround regex.
fn starts_new_sentence(c: char) -> bool {
    c.is_ascii_uppercase() || matches!(c, '\u{c4}' | '\u{d6}' | '\u{dc}')
}

fn definition_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(def |class |function |const |let |var |public |private |@\w+)").expect("definition-line regex is valid")
    })
}

fn collapse_blank_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("blank-run regex is valid"))
}

fn collapse_inline_whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t]+").expect("inline-whitespace regex is valid"))
}

fn trim_around_newlines() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r" ?\n ?").expect("newline-trim regex is valid"))
}

/// Splits a document's text into structurally coherent chunks, dispatching
/// on the source file's extension.
pub struct SmartChunker {
    config: ChunkConfig,
}

impl SmartChunker {
    pub fn new(config: ChunkConfig) -> Self {
        Self { config }
    }

    fn clean(&self, text: &str) -> String {
        let text = collapse_blank_runs().replace_all(text, "\n\n");
        let text = collapse_inline_whitespace().replace_all(&text, " ");
        let text = trim_around_newlines().replace_all(&text, "\n");
        text.trim().to_string()
    }

    /// Splits on `[.!?]` followed by whitespace and an uppercase letter,
    /// without consuming the whitespace into either side.
    fn split_sentences(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let mut sentences = Vec::new();
        let mut start = 0usize;
        let mut i = 0usize;

        while i < chars.len() {
            if matches!(chars[i], '.' | '!' | '?') {
                let mut j = i + 1;
                let mut saw_whitespace = false;
                while j < chars.len() && chars[j].is_whitespace() {
                    saw_whitespace = true;
                    j += 1;
                }
                if saw_whitespace && j < chars.len() && starts_new_sentence(chars[j]) {
                    sentences.push(chars[start..i + 1].iter().collect::<String>());
                    start = j;
                    i = j;
                    continue;
                }
            }
            i += 1;
        }
        if start < chars.len() {
            sentences.push(chars[start..].iter().collect());
        }

        sentences.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
    }

    fn tail(&self, text: &str) -> String {
        if text.chars().count() > self.config.overlap {
            text.chars().skip(text.chars().count() - self.config.overlap).collect()
        } else {
            text.to_string()
        }
    }

    fn chunk_prose(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut current_size = 0usize;

        let paragraph_boundary = Regex::new(r"\n\s*\n").expect("paragraph-boundary regex is valid");
        for para in paragraph_boundary.split(text) {
            let para = para.trim();
            if para.is_empty() {
                continue;
            }
            let para_size = para.chars().count();

            if current_size + para_size + 2 <= self.config.max_chunk_size {
                current.push(para.to_string());
                current_size += para_size + 2;
            } else if para_size > self.config.max_chunk_size {
                if !current.is_empty() {
                    chunks.push(current.join("\n\n"));
                    current.clear();
                    current_size = 0;
                }
                for sentence in self.split_sentences(para) {
                    let sent_size = sentence.chars().count();
                    if current_size + sent_size + 1 <= self.config.max_chunk_size {
                        current.push(sentence);
                        current_size += sent_size + 1;
                    } else {
                        if !current.is_empty() {
                            chunks.push(current.join(" "));
                        }
                        let overlap_text = current.last().map(|s| self.tail(s)).unwrap_or_default();
                        current_size = overlap_text.chars().count() + sent_size + 1;
                        current = if overlap_text.is_empty() {
                            vec![sentence]
                        } else {
                            vec![overlap_text, sentence]
                        };
                    }
                }
            } else {
                if !current.is_empty() {
                    chunks.push(current.join("\n\n"));
                }
                let overlap_text = current.last().map(|s| self.tail(s)).unwrap_or_default();
                current_size = overlap_text.chars().count() + para_size + 2;
                current = if overlap_text.is_empty() {
                    vec![para.to_string()]
                } else {
                    vec![overlap_text, para.to_string()]
                };
            }
        }
        if !current.is_empty() {
            chunks.push(current.join("\n\n"));
        }

        if chunks.len() > 1 {
            chunks.retain(|c| c.chars().count() >= self.config.min_chunk_size);
        }
        chunks
    }

    fn chunk_tabular(&self, text: &str) -> Vec<String> {
        let lines: Vec<&str> = text.split('\n').collect();
        if lines.is_empty() {
            return Vec::new();
        }

        let header = lines[0];
        let header_size = header.chars().count() + 1;
        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut current_size = 0usize;

        for (i, line) in lines.iter().enumerate() {
            let line_size = line.chars().count() + 1;
            if i == 0 {
                current.push(line);
                current_size = line_size;
                continue;
            }
            if current_size + line_size <= self.config.max_chunk_size {
                current.push(line);
                current_size += line_size;
            } else {
                if !current.is_empty() {
                    chunks.push(current.join("\n"));
                }
                current = vec![header, line];
                current_size = header_size + line_size;
            }
        }
        if current.len() > 1 {
            chunks.push(current.join("\n"));
        }
        chunks
    }

    fn chunk_code(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut current_size = 0usize;

        for line in text.split('\n') {
            let line_size = line.chars().count() + 1;
            let is_definition = definition_line().is_match(line);

            if is_definition && !current.is_empty() && current_size > self.config.min_chunk_size {
                chunks.push(current.join("\n"));
                current = vec![line];
                current_size = line_size;
            } else if current_size + line_size <= self.config.max_chunk_size {
                current.push(line);
                current_size += line_size;
            } else {
                if !current.is_empty() {
                    chunks.push(current.join("\n"));
                }
                current = vec![line];
                current_size = line_size;
            }
        }
        if !current.is_empty() {
            chunks.push(current.join("\n"));
        }
        chunks
    }

    fn chunk_structured(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut current_size = 0usize;

        for line in text.split('\n') {
            let line_size = line.chars().count() + 1;
            if current_size + line_size <= self.config.max_chunk_size {
                current.push(line);
                current_size += line_size;
            } else {
                if !current.is_empty() {
                    chunks.push(current.join("\n"));
                }
                current = vec![line];
                current_size = line_size;
            }
        }
        if !current.is_empty() {
            chunks.push(current.join("\n"));
        }
        chunks
    }

    fn chunk_strings(&self, extension: Option<&str>, text: &str) -> Vec<String> {
        if text.trim().chars().count() < self.config.min_chunk_size {
            let trimmed = text.trim();
            return if trimmed.is_empty() { Vec::new() } else { vec![trimmed.to_string()] };
        }

        let cleaned = self.clean(text);
        match extension {
            Some(ext) if TABULAR_EXTENSIONS.contains(&ext) => self.chunk_tabular(&cleaned),
            Some(ext) if CODE_EXTENSIONS.contains(&ext) => self.chunk_code(&cleaned),
            Some(ext) if STRUCTURED_EXTENSIONS.contains(&ext) => self.chunk_structured(&cleaned),
            _ => self.chunk_prose(&cleaned),
        }
    }
}

impl Default for SmartChunker {
    fn default() -> Self {
        Self::new(ChunkConfig::default())
    }
}

impl ChunkerService for SmartChunker {
    fn chunk(&self, document_id: &str, extension: Option<&str>, text: &str) -> Result<Vec<Chunk>, IngestionError> {
        let pieces = self.chunk_strings(extension, text);
        Ok(pieces.into_iter().enumerate().map(|(i, t)| Chunk::new(document_id, i, t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_becomes_a_single_chunk() {
        let chunker = SmartChunker::default();
        let chunks = chunker.chunk("doc1", Some("txt"), "too short").unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "too short");
    }

    #[test]
    fn empty_text_produces_no_chunks() {
        let chunker = SmartChunker::default();
        let chunks = chunker.chunk("doc1", Some("txt"), "   ").unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn tabular_chunks_repeat_the_header_row() {
        let config = ChunkConfig {
            max_chunk_size: 40,
            min_chunk_size: 1,
            overlap: 5,
        };
        let chunker = SmartChunker::new(config);
        let text = "id,name\n1,widget\n2,gadget\n3,sprocket\n4,bolt\n5,nut";
        let chunks = chunker.chunk("doc1", Some(".csv"), text).unwrap();
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.starts_with("id,name"));
        }
    }

    #[test]
    fn code_chunks_split_on_definitions() {
        let config = ChunkConfig {
            max_chunk_size: 1000,
            min_chunk_size: 5,
            overlap: 10,
        };
        let chunker = SmartChunker::new(config);
        let text = "def foo():\n    return 1\n\n\ndef bar():\n    return 2\n";
        let chunks = chunker.chunk("doc1", Some(".py"), text).unwrap();
        assert!(chunks.iter().any(|c| c.text.contains("def foo")));
        assert!(chunks.iter().any(|c| c.text.contains("def bar")));
    }

    #[test]
    fn sentence_split_keeps_boundary_punctuation_with_its_sentence() {
        let chunker = SmartChunker::default();
        let sentences = chunker.split_sentences("Hello world. This is Rust! Does it work? Yes it does.");
        assert_eq!(
            sentences,
            vec![
                "Hello world.".to_string(),
                "This is Rust!".to_string(),
                "Does it work?".to_string(),
                "Yes it does.".to_string(),
            ]
        );
    }

    #[test]
    fn ordinals_are_assigned_in_order() {
        let chunker = SmartChunker::default();
        let long_prose = "Sentence one. Sentence two.\n\n".repeat(50);
        let chunks = chunker.chunk("doc1", None, &long_prose).unwrap();
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.ordinal, i);
        }
    }
}
