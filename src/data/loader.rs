// ============================================================
// Layer 4 - Corpus Loader
// ============================================================
// Loads plain-text training corpora from a directory.
//
// Every *.txt file directly under the directory is one Document.
// The file name decides the split (see CorpusSplit): anything
// with "dev" in its name is validation data, everything else is
// training data. Files that cannot be read are logged and
// skipped so one bad file does not stop a long training run.

use anyhow::{Context, Result};
use std::{fs, path::Path};

use crate::domain::document::Document;
use crate::domain::traits::CorpusSource;

/// Loads all .txt files from a given directory.
pub struct TextCorpusLoader {
    dir: String,
}

impl TextCorpusLoader {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: dir.into() }
    }
}

impl CorpusSource for TextCorpusLoader {
    fn load_all(&self) -> Result<Vec<Document>> {
        let dir = Path::new(&self.dir);

        if !dir.is_dir() {
            anyhow::bail!("Corpus directory '{}' does not exist", self.dir);
        }

        let mut paths: Vec<_> = fs::read_dir(dir)
            .with_context(|| format!("Cannot read directory '{}'", self.dir))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("txt"))
            .collect();

        // read_dir order is platform dependent; sort so splits are reproducible
        paths.sort();

        let mut docs = Vec::new();
        for path in paths {
            match load_single_text(&path) {
                Ok(doc) => {
                    tracing::debug!(
                        "Loaded: {} ({:?}, {} chars)",
                        doc.source,
                        doc.split,
                        doc.text.chars().count()
                    );
                    docs.push(doc);
                }
                Err(e) => {
                    tracing::warn!("Skipping '{}': {:#}", path.display(), e);
                }
            }
        }

        tracing::info!("Loaded {} corpus files from '{}'", docs.len(), self.dir);
        Ok(docs)
    }
}

fn load_single_text(path: &Path) -> Result<Document> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}' as UTF-8", path.display()))?;

    let source = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string();

    Ok(Document::new(source, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::CorpusSplit;

    #[test]
    fn test_loads_txt_files_with_split() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("en_train.txt"), "hello\nworld\n").unwrap();
        fs::write(dir.path().join("en_dev.txt"), "held out\n").unwrap();
        fs::write(dir.path().join("notes.md"), "ignored").unwrap();

        let docs = TextCorpusLoader::new(dir.path().to_string_lossy()).load_all().unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].source, "en_dev.txt");
        assert_eq!(docs[0].split, CorpusSplit::Dev);
        assert_eq!(docs[1].split, CorpusSplit::Train);
    }

    #[test]
    fn test_invalid_utf8_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.txt"), [0xff, 0xfe, 0x00]).unwrap();
        fs::write(dir.path().join("good.txt"), "ok").unwrap();

        let docs = TextCorpusLoader::new(dir.path().to_string_lossy()).load_all().unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].source, "good.txt");
    }

    #[test]
    fn test_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(TextCorpusLoader::new(missing.to_string_lossy()).load_all().is_err());
    }
}
