// ============================================================
// Layer 3 - Vocabulary Errors
// ============================================================
// Typed failures of the vocabulary builder and its persisted
// tables. The application layer wraps these in anyhow, but
// callers that need to react to a specific case (a missing
// script file vs. a corrupt table) can downcast to VocabError.

use std::path::PathBuf;

/// Result type alias for the vocabulary core.
pub type VocabResult<T> = std::result::Result<T, VocabError>;

#[derive(Debug, thiserror::Error)]
pub enum VocabError {
    /// A selector named a group this build does not know.
    #[error("unknown script group '{name}' (valid: {valid})")]
    UnknownScriptGroup { name: String, valid: String },

    /// A group that needs pre-generated data has no file on disk.
    #[error(
        "script group '{group}' requires '{}' but it does not exist; \
         run `char-predict gen-scripts` to create it",
        path.display()
    )]
    ScriptFileMissing { group: String, path: PathBuf },

    /// The pre-generated file exists but cannot be used.
    #[error("script file '{}' for group '{group}' is malformed: {reason}", path.display())]
    ScriptFileMalformed {
        group:  String,
        path:   PathBuf,
        reason: String,
    },

    /// Neither persisted table format exists in the work directory.
    #[error("no vocabulary found in '{}'", dir.display())]
    VocabNotFound { dir: PathBuf },

    /// A persisted table exists but does not describe a valid bijection.
    #[error("vocabulary file '{}' is malformed: {reason}", path.display())]
    MalformedVocab { path: PathBuf, reason: String },

    /// A predictor returned an index the table does not contain.
    #[error("index {index} is outside the vocabulary (size {size})")]
    IndexOutOfRange { index: u32, size: usize },

    /// A character that the line-delimited format cannot carry.
    #[error("character {0:?} cannot be stored in the line-delimited vocabulary format")]
    UnrepresentableChar(char),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_script_message_names_group_and_path() {
        let err = VocabError::ScriptFileMissing {
            group: "cjk".to_string(),
            path:  PathBuf::from("scripts/chinese.json"),
        };
        let msg = err.to_string();
        assert!(msg.contains("cjk"));
        assert!(msg.contains("scripts/chinese.json"));
        assert!(msg.contains("gen-scripts"));
    }
}
