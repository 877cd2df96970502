// ============================================================
// Layer 4 - Script File Loader
// ============================================================
// Implements ScriptSource over a directory of pre-generated
// script files, each shaped like:
//
//   {"characters": ["一", "丁", ...]}
//
// Resolution per group:
//   latin                  → curated lists only
//   cyrillic               → cyrillic.json if present, else curated
//   cjk/arabic/devanagari  → their files, all required
//
// A missing required file and a malformed one are different
// errors; neither ever resolves to an empty set.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::domain::error::{VocabError, VocabResult};
use crate::domain::script::ScriptGroup;
use crate::domain::traits::ScriptSource;

pub struct FileScriptSource {
    dir: PathBuf,
}

impl FileScriptSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn file_path(&self, stem: &str) -> PathBuf {
        script_file_path(&self.dir, stem)
    }
}

pub fn script_file_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{stem}.json"))
}

impl ScriptSource for FileScriptSource {
    fn characters(&self, group: ScriptGroup) -> VocabResult<BTreeSet<char>> {
        let mut chars = BTreeSet::new();

        for stem in group.data_files() {
            let path = self.file_path(stem);
            if !path.exists() {
                if let Some(curated) = group.curated_set() {
                    tracing::debug!(
                        "No '{}' for group '{}', using curated letters",
                        path.display(),
                        group
                    );
                    return Ok(curated);
                }
                return Err(VocabError::ScriptFileMissing {
                    group: group.name().to_string(),
                    path,
                });
            }
            chars.extend(read_script_file(group, &path)?);
        }

        if group.data_files().is_empty() {
            // Fully curated group
            if let Some(curated) = group.curated_set() {
                chars.extend(curated);
            }
        }

        Ok(chars)
    }
}

/// Parse one script file. Entries longer than one code point
/// contribute each of their code points.
pub fn read_script_file(group: ScriptGroup, path: &Path) -> VocabResult<BTreeSet<char>> {
    let malformed = |reason: String| VocabError::ScriptFileMalformed {
        group: group.name().to_string(),
        path:  path.to_path_buf(),
        reason,
    };

    let raw = fs::read_to_string(path).map_err(|e| malformed(format!("unreadable: {e}")))?;
    let json: Value = serde_json::from_str(&raw).map_err(|e| malformed(format!("invalid JSON: {e}")))?;

    let entries = json
        .get("characters")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("missing \"characters\" array".to_string()))?;

    if entries.is_empty() {
        return Err(malformed("\"characters\" is empty".to_string()));
    }

    let mut chars = BTreeSet::new();
    for (i, entry) in entries.iter().enumerate() {
        match entry.as_str() {
            Some(s) if !s.is_empty() => chars.extend(s.chars()),
            Some(_) => return Err(malformed(format!("entry {i} is an empty string"))),
            None    => return Err(malformed(format!("entry {i} is not a string"))),
        }
    }

    tracing::debug!("Read {} characters from '{}'", chars.len(), path.display());
    Ok(chars)
}
