// ============================================================
// Layer 6 - Script File Generator
// ============================================================
// Writes the pre-generated script files that the file-backed
// script groups read. This is the only way those files come
// into existence: loading never regenerates them.
//
// Each file lists every assigned, visible code point of its
// Unicode blocks, in code-point order:
//
//   chinese     U+4E00-9FFF, U+3400-4DBF
//   japanese    U+3040-309F, U+30A0-30FF, U+31F0-31FF
//   korean      U+AC00-D7AF, U+1100-11FF, U+3130-318F
//   arabic      U+0600-06FF
//   devanagari  U+0900-097F
//   cyrillic    the curated national alphabets

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use crate::data::script_loader::script_file_path;
use crate::domain::script::ScriptGroup;
use crate::infra::atomic::write_atomic;

struct ScriptBlocks {
    stem:   &'static str,
    ranges: &'static [RangeInclusive<u32>],
}

const BLOCKS: &[ScriptBlocks] = &[
    ScriptBlocks { stem: "chinese",    ranges: &[0x4E00..=0x9FFF, 0x3400..=0x4DBF] },
    ScriptBlocks { stem: "japanese",   ranges: &[0x3040..=0x309F, 0x30A0..=0x30FF, 0x31F0..=0x31FF] },
    ScriptBlocks { stem: "korean",     ranges: &[0xAC00..=0xD7AF, 0x1100..=0x11FF, 0x3130..=0x318F] },
    ScriptBlocks { stem: "arabic",     ranges: &[0x0600..=0x06FF] },
    ScriptBlocks { stem: "devanagari", ranges: &[0x0900..=0x097F] },
];

/// Characters of the given Unicode ranges, minus control and
/// whitespace code points. Unassigned scalar gaps are skipped by
/// `char::from_u32`.
pub fn chars_in_ranges(ranges: &[RangeInclusive<u32>]) -> BTreeSet<char> {
    ranges
        .iter()
        .flat_map(|r| r.clone())
        .filter_map(char::from_u32)
        .filter(|c| !c.is_control() && !c.is_whitespace())
        .collect()
}

fn render(chars: &BTreeSet<char>) -> Result<Vec<u8>> {
    let entries: Vec<String> = chars.iter().map(|c| c.to_string()).collect();
    let mut bytes = serde_json::to_vec_pretty(&serde_json::json!({ "characters": entries }))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Write every script file into `dir`. Returns the paths written.
pub fn generate_script_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<(&str, BTreeSet<char>)> = BLOCKS
        .iter()
        .map(|b| (b.stem, chars_in_ranges(b.ranges)))
        .collect();

    if let Some(cyrillic) = ScriptGroup::Cyrillic.curated_set() {
        files.push(("cyrillic", cyrillic));
    }

    let mut written = Vec::with_capacity(files.len());
    for (stem, chars) in files {
        let path = script_file_path(dir, stem);
        write_atomic(&path, &render(&chars)?)
            .with_context(|| format!("Cannot write script file '{}'", path.display()))?;
        tracing::info!("Wrote {} characters to '{}'", chars.len(), path.display());
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::script_loader::FileScriptSource;
    use crate::domain::traits::ScriptSource;

    #[test]
    fn test_ranges_skip_whitespace_and_controls() {
        let chars = chars_in_ranges(&[0x0000..=0x007F]);
        assert!(chars.contains(&'a'));
        assert!(!chars.contains(&' '));
        assert!(!chars.contains(&'\n'));
        assert!(!chars.contains(&'\u{7F}'));
    }

    #[test]
    fn test_generated_files_satisfy_every_group() {
        let dir = tempfile::tempdir().unwrap();
        let written = generate_script_files(dir.path()).unwrap();
        assert_eq!(written.len(), 6);

        let src = FileScriptSource::new(dir.path());
        for group in ScriptGroup::ALL {
            assert!(!src.characters(group).unwrap().is_empty(), "group {group}");
        }
        assert!(src.characters(ScriptGroup::Cjk).unwrap().contains(&'한'));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        generate_script_files(a.path()).unwrap();
        generate_script_files(b.path()).unwrap();
        let read = |d: &Path| std::fs::read(script_file_path(d, "arabic")).unwrap();
        assert_eq!(read(a.path()), read(b.path()));
    }
}
