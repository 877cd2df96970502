// ============================================================
// Layer 3 - Corpus Document
// ============================================================
// One text file from the training corpus. The split is decided
// from the file name when the document is loaded, so later
// stages never need to look at paths again.

use serde::{Deserialize, Serialize};

/// Which role a corpus file plays in training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorpusSplit {
    Train,
    Dev,
}

impl CorpusSplit {
    /// `dev` anywhere in the name marks validation data; anything
    /// else (including files tagged `train`) is training data.
    pub fn from_file_name(name: &str) -> Self {
        if name.to_lowercase().contains("dev") {
            CorpusSplit::Dev
        } else {
            CorpusSplit::Train
        }
    }
}

/// A raw document loaded from disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// File name, kept for log messages
    pub source: String,

    pub split: CorpusSplit,

    /// Full file contents before cleaning
    pub text: String,
}

impl Document {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        let source = source.into();
        let split = CorpusSplit::from_file_name(&source);
        Self { source, split, text: text.into() }
    }
}
