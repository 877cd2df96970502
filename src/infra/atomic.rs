// ============================================================
// Layer 6 - Atomic File Writes
// ============================================================
// Persisted tables are read by other processes (a predict run
// while a vocab rebuild is in flight), so every write goes to a
// sibling temp file first and is then renamed over the target.
// rename() within one directory is atomic on the platforms we
// run on: readers see the old file or the new one, never half.
//
// Each call gets its own uniquely named temp file, so concurrent
// writers to one target never share a temp path. The temp file is
// removed when it is dropped without being persisted.

use std::{
    fs,
    io::{self, Write},
    path::Path,
};

pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    fs::create_dir_all(dir)?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("out");

    let mut tmp = tempfile::Builder::new()
        .prefix(&format!(".{file_name}."))
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_existing_file_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.json");
        write_atomic(&path, b"old").unwrap();
        write_atomic(&path, b"new").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_concurrent_writers_to_one_path_both_succeed() {
        use std::sync::{Arc, Barrier};
        use std::thread;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab_chars.txt");
        let big_a = vec![b'a'; 1 << 20];
        let big_b = vec![b'b'; 1 << 20];

        for _ in 0..10 {
            let barrier = Arc::new(Barrier::new(2));
            let handles: Vec<_> = [big_a.clone(), big_b.clone()]
                .into_iter()
                .map(|bytes| {
                    let barrier = Arc::clone(&barrier);
                    let path = path.clone();
                    thread::spawn(move || {
                        barrier.wait();
                        write_atomic(&path, &bytes)
                    })
                })
                .collect();
            for h in handles {
                h.join().unwrap().unwrap();
            }

            // One writer wins whole; never a mix of both
            let written = fs::read(&path).unwrap();
            assert_eq!(written.len(), 1 << 20);
            assert!(written == big_a || written == big_b);
        }
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_creates_missing_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/c.txt");
        write_atomic(&path, b"x").unwrap();
        assert!(path.exists());
    }
}
