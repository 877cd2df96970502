// ============================================================
// Layer 2 - VocabUseCase
// ============================================================
// The two vocabulary-side workflows:
//
//   generate_scripts() - write the pre-generated script files
//   build()            - rebuild the table from a selector and
//                        persist it in both formats

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::data::script_loader::FileScriptSource;
use crate::domain::script::ScriptSelector;
use crate::domain::vocab::{VocabBuilder, Vocabulary};
use crate::infra::script_writer::generate_script_files;
use crate::infra::vocab_store::VocabStore;

pub struct VocabUseCase {
    work_dir:    String,
    scripts_dir: String,
}

impl VocabUseCase {
    pub fn new(work_dir: impl Into<String>, scripts_dir: impl Into<String>) -> Self {
        Self { work_dir: work_dir.into(), scripts_dir: scripts_dir.into() }
    }

    pub fn generate_scripts(&self) -> Result<Vec<PathBuf>> {
        generate_script_files(Path::new(&self.scripts_dir))
    }

    pub fn build<S: AsRef<str>>(&self, names: &[S]) -> Result<Vocabulary> {
        let selector = ScriptSelector::from_names(names)?;
        let source   = FileScriptSource::new(&self.scripts_dir);
        let vocab    = VocabBuilder::new(&source).build(&selector)?;
        VocabStore::new(&self.work_dir)
            .save_all(&vocab)
            .with_context(|| format!("Cannot save vocabulary to '{}'", self.work_dir))?;
        Ok(vocab)
    }
}
