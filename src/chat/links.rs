// Markdown file-reference extraction from streamed text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Markdown inline link: `[label](target)`.
static MARKDOWN_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("link pattern compiles"));

/// Accumulates unique markdown link targets across streamed chunks.
///
/// Each chunk is scanned independently, so a link split across a chunk
/// boundary goes undetected. Targets dedup by exact string match and keep
/// first-seen order.
#[derive(Debug, Default)]
pub struct FileReferences {
    targets: Vec<String>,
}

impl FileReferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record any link targets appearing in one chunk.
    pub fn scan(&mut self, chunk: &str) {
        for capture in MARKDOWN_LINK.captures_iter(chunk) {
            let target = &capture[2];
            if !self.targets.iter().any(|t| t == target) {
                self.targets.push(target.to_string());
            }
        }
    }

    pub fn into_targets(self) -> Vec<String> {
        self.targets
    }
}
