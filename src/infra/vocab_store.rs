// ============================================================
// Layer 6 - Vocabulary Store
// ============================================================
// Persists the character table in the work directory so that
// training and prediction always agree on every index.
//
// Two formats, both in index order:
//
//   vocab_chars.txt     one character per line; a space at
//                       index 0 is written as an empty first line
//   char_to_index.json  {"char": index, ...} sorted by key
//
// load() prefers the line format and falls back to JSON. Both
// writers go through write_atomic so a concurrent reader never
// sees a partial table, and both are byte-deterministic: the same
// vocabulary always produces the same bytes.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::error::{VocabError, VocabResult};
use crate::domain::script::ScriptSelector;
use crate::domain::traits::ScriptSource;
use crate::domain::vocab::{VocabBuilder, Vocabulary, PAD_CHAR};
use crate::infra::atomic::write_atomic;

pub const LINES_FILE: &str = "vocab_chars.txt";
pub const JSON_FILE:  &str = "char_to_index.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VocabFormat {
    Lines,
    Json,
}

impl VocabFormat {
    pub fn file_name(self) -> &'static str {
        match self {
            VocabFormat::Lines => LINES_FILE,
            VocabFormat::Json  => JSON_FILE,
        }
    }
}

pub struct VocabStore {
    dir: PathBuf,
}

impl VocabStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, format: VocabFormat) -> PathBuf {
        self.dir.join(format.file_name())
    }

    pub fn exists(&self) -> bool {
        self.path(VocabFormat::Lines).exists() || self.path(VocabFormat::Json).exists()
    }

    /// Write the table in one format, returning the file written.
    pub fn save(&self, vocab: &Vocabulary, format: VocabFormat) -> VocabResult<PathBuf> {
        let bytes = match format {
            VocabFormat::Lines => to_lines(vocab)?,
            VocabFormat::Json  => to_json(vocab)?,
        };
        let path = self.path(format);
        write_atomic(&path, &bytes)?;
        tracing::debug!("Wrote {} entries to '{}'", vocab.len(), path.display());
        Ok(path)
    }

    /// Write both formats.
    pub fn save_all(&self, vocab: &Vocabulary) -> VocabResult<()> {
        self.save(vocab, VocabFormat::Lines)?;
        self.save(vocab, VocabFormat::Json)?;
        tracing::info!("Saved vocabulary ({} characters) to '{}'", vocab.len(), self.dir.display());
        Ok(())
    }

    /// Load the table, preferring the line format.
    pub fn load(&self) -> VocabResult<Vocabulary> {
        for format in [VocabFormat::Lines, VocabFormat::Json] {
            if self.path(format).exists() {
                return self.load_format(format);
            }
        }
        Err(VocabError::VocabNotFound { dir: self.dir.clone() })
    }

    pub fn load_format(&self, format: VocabFormat) -> VocabResult<Vocabulary> {
        let path = self.path(format);
        let raw  = fs::read_to_string(&path)?;
        let vocab = match format {
            VocabFormat::Lines => parse_lines(&raw, &path)?,
            VocabFormat::Json  => parse_json(&raw, &path)?,
        };
        tracing::info!("Loaded vocabulary of {} characters from '{}'", vocab.len(), path.display());
        Ok(vocab)
    }

    /// Load the persisted table, or build and persist one when none
    /// exists (or when `rebuild` is set).
    pub fn load_or_build<S: ScriptSource + ?Sized>(
        &self,
        selector: &ScriptSelector,
        source:   &S,
        rebuild:  bool,
    ) -> VocabResult<Vocabulary> {
        if !rebuild && self.exists() {
            return self.load();
        }
        let vocab = VocabBuilder::new(source).build(selector)?;
        self.save_all(&vocab)?;
        Ok(vocab)
    }
}

// ─── Line format ──────────────────────────────────────────────────────────────

fn to_lines(vocab: &Vocabulary) -> VocabResult<Vec<u8>> {
    let mut out = String::with_capacity(vocab.len() * 2);
    for (i, &c) in vocab.chars().iter().enumerate() {
        if c == '\n' || c == '\r' {
            return Err(VocabError::UnrepresentableChar(c));
        }
        // A leading space is written as an empty first line
        if !(i == 0 && c == PAD_CHAR) {
            out.push(c);
        }
        out.push('\n');
    }
    Ok(out.into_bytes())
}

fn parse_lines(raw: &str, path: &Path) -> VocabResult<Vocabulary> {
    let malformed = |reason: String| VocabError::MalformedVocab { path: path.to_path_buf(), reason };

    if raw.is_empty() {
        return Err(malformed("file is empty".to_string()));
    }
    if raw.contains('\r') {
        return Err(malformed("contains a carriage return".to_string()));
    }

    let body = raw.strip_suffix('\n').unwrap_or(raw);
    let mut chars = Vec::new();
    for (i, line) in body.split('\n').enumerate() {
        let mut it = line.chars();
        match (it.next(), it.next()) {
            (None, _) if i == 0    => chars.push(PAD_CHAR),
            (None, _)              => return Err(malformed(format!("line {} is empty", i + 1))),
            (Some(c), None)        => chars.push(c),
            (Some(_), Some(_))     => {
                return Err(malformed(format!("line {} holds more than one character", i + 1)))
            }
        }
    }

    Vocabulary::from_ordered(chars).map_err(malformed)
}

// ─── JSON format ──────────────────────────────────────────────────────────────

fn to_json(vocab: &Vocabulary) -> VocabResult<Vec<u8>> {
    let map: BTreeMap<String, u32> = vocab.entries().map(|(c, i)| (c.to_string(), i)).collect();
    let mut bytes = serde_json::to_vec_pretty(&map).map_err(std::io::Error::from)?;
    bytes.push(b'\n');
    Ok(bytes)
}

fn parse_json(raw: &str, path: &Path) -> VocabResult<Vocabulary> {
    let malformed = |reason: String| VocabError::MalformedVocab { path: path.to_path_buf(), reason };

    let map: BTreeMap<String, u32> =
        serde_json::from_str(raw).map_err(|e| malformed(format!("invalid JSON: {e}")))?;

    let mut slots: Vec<Option<char>> = vec![None; map.len()];
    for (key, &index) in &map {
        let mut it = key.chars();
        let c = match (it.next(), it.next()) {
            (Some(c), None) => c,
            _ => return Err(malformed(format!("key {key:?} is not a single character"))),
        };
        let slot = slots
            .get_mut(index as usize)
            .ok_or_else(|| malformed(format!("index {index} is outside 0..{}", map.len())))?;
        if slot.replace(c).is_some() {
            return Err(malformed(format!("index {index} is assigned twice")));
        }
    }

    // Every slot is filled: n distinct in-range indices over n keys
    let chars = slots.into_iter().flatten().collect();
    Vocabulary::from_ordered(chars).map_err(malformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::script::ScriptGroup;
    use std::collections::BTreeSet;

    struct CuratedOnly;

    impl ScriptSource for CuratedOnly {
        fn characters(&self, group: ScriptGroup) -> VocabResult<BTreeSet<char>> {
            Ok(group.curated_set().unwrap_or_default())
        }
    }

    fn sample_vocab() -> Vocabulary {
        VocabBuilder::new(&CuratedOnly)
            .build(&ScriptSelector::only([ScriptGroup::Latin, ScriptGroup::Cyrillic]))
            .unwrap()
    }

    #[test]
    fn test_round_trip_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let store = VocabStore::new(dir.path());
        let vocab = sample_vocab();
        for format in [VocabFormat::Lines, VocabFormat::Json] {
            store.save(&vocab, format).unwrap();
            assert_eq!(store.load_format(format).unwrap(), vocab);
        }
    }

    #[test]
    fn test_saving_is_byte_identical() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        VocabStore::new(a.path()).save_all(&sample_vocab()).unwrap();
        VocabStore::new(b.path()).save_all(&sample_vocab()).unwrap();
        for name in [LINES_FILE, JSON_FILE] {
            assert_eq!(fs::read(a.path().join(name)).unwrap(), fs::read(b.path().join(name)).unwrap());
        }
    }

    #[test]
    fn test_leading_space_is_empty_first_line() {
        let dir = tempfile::tempdir().unwrap();
        let store = VocabStore::new(dir.path());
        store.save(&Vocabulary::from_chars(['b', 'a']), VocabFormat::Lines).unwrap();
        assert_eq!(fs::read_to_string(store.path(VocabFormat::Lines)).unwrap(), "\na\nb\n");
    }

    #[test]
    fn test_json_is_not_ascii_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let store = VocabStore::new(dir.path());
        store.save(&sample_vocab(), VocabFormat::Json).unwrap();
        let text = fs::read_to_string(store.path(VocabFormat::Json)).unwrap();
        assert!(text.contains("\"я\""));
    }

    #[test]
    fn test_load_prefers_lines_then_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = VocabStore::new(dir.path());
        assert!(matches!(store.load(), Err(VocabError::VocabNotFound { .. })));

        fs::write(dir.path().join(JSON_FILE), r#"{" ": 0, "a": 1}"#).unwrap();
        assert_eq!(store.load().unwrap().len(), 2);

        fs::write(dir.path().join(LINES_FILE), "\na\nb\n").unwrap();
        assert_eq!(store.load().unwrap().chars(), &[' ', 'a', 'b']);
    }

    #[test]
    fn test_missing_space_appended() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(LINES_FILE), "a\nb\n").unwrap();
        let vocab = VocabStore::new(dir.path()).load().unwrap();
        assert_eq!(vocab.index_of('a'), Some(0));
        assert_eq!(vocab.pad_index(), 2);
    }

    #[test]
    fn test_malformed_line_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = VocabStore::new(dir.path());
        for body in ["", "a\n\nb\n", "a\r\nb\n", "ab\n", "a\na\n"] {
            fs::write(dir.path().join(LINES_FILE), body).unwrap();
            let err = store.load().unwrap_err();
            assert!(matches!(err, VocabError::MalformedVocab { .. }), "body {body:?}: {err}");
        }
    }

    #[test]
    fn test_malformed_json_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = VocabStore::new(dir.path());
        for body in ["[]", r#"{"ab": 0}"#, r#"{"a": 0, "b": 0}"#, r#"{"a": 0, "b": 5}"#] {
            fs::write(dir.path().join(JSON_FILE), body).unwrap();
            let err = store.load().unwrap_err();
            assert!(matches!(err, VocabError::MalformedVocab { .. }), "body {body}: {err}");
        }
    }

    #[test]
    fn test_newline_cannot_be_saved_as_lines() {
        let dir = tempfile::tempdir().unwrap();
        let vocab = Vocabulary::from_ordered(vec![' ', '\n']).unwrap();
        let err = VocabStore::new(dir.path()).save(&vocab, VocabFormat::Lines).unwrap_err();
        assert!(matches!(err, VocabError::UnrepresentableChar('\n')));
    }

    #[test]
    fn test_load_or_build_persists_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = VocabStore::new(dir.path());
        let sel = ScriptSelector::only([ScriptGroup::Latin]);

        let built = store.load_or_build(&sel, &CuratedOnly, false).unwrap();
        assert!(store.exists());

        // A different selector does not change an existing table
        let loaded = store.load_or_build(&ScriptSelector::only([ScriptGroup::Cyrillic]), &CuratedOnly, false).unwrap();
        assert_eq!(loaded, built);

        let rebuilt = store.load_or_build(&ScriptSelector::only([ScriptGroup::Cyrillic]), &CuratedOnly, true).unwrap();
        assert_ne!(rebuilt, built);
    }
}
