use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Smallest ring the engine will run with.
pub const MIN_BACKUP_COUNT: usize = 2;

/// Writes sealed batches into a bounded ring of numbered files.
///
/// Files are named `<dir>/<slot>.log` for `slot` in `0..backup_count`. Each
/// successful rotation writes to the slot under the cursor, then advances the
/// cursor modulo `backup_count`. Reusing a slot overwrites what it held, so the
/// directory never grows past `backup_count` files.
#[derive(Debug)]
pub struct RotationEngine {
    dir: PathBuf,
    backup_count: usize,
    /// Rotation lock; held for the whole write so rotations never overlap.
    cursor: Mutex<usize>,
}

impl RotationEngine {
    /// Create an engine over `dir`. `backup_count` below 2 is raised to 2.
    pub fn new(dir: impl Into<PathBuf>, backup_count: usize) -> Self {
        Self {
            dir: dir.into(),
            backup_count: backup_count.max(MIN_BACKUP_COUNT),
            cursor: Mutex::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn backup_count(&self) -> usize {
        self.backup_count
    }

    /// Slot the next rotation will write to.
    pub fn cursor(&self) -> usize {
        *self.lock()
    }

    /// Path of a ring slot.
    pub fn slot_path(&self, slot: usize) -> PathBuf {
        self.dir.join(format!("{}.log", slot))
    }

    /// Persist a batch of lines, one per line, in order.
    ///
    /// An empty batch is a no-op and returns `Ok(None)`. On failure the cursor
    /// stays put and the batch is not retained.
    pub fn rotate(&self, lines: &[String]) -> io::Result<Option<PathBuf>> {
        if lines.is_empty() {
            return Ok(None);
        }
        self.write_encoded(&encode(lines)).map(Some)
    }

    /// Persist a batch that is already newline-terminated.
    pub(crate) fn write_encoded(&self, bytes: &[u8]) -> io::Result<PathBuf> {
        let mut cursor = self.lock();
        let path = self.slot_path(*cursor);

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        file.write_all(bytes)?;
        file.flush()?;
        drop(file);

        *cursor = (*cursor + 1) % self.backup_count;
        tracing::trace!(path = %path.display(), next = *cursor, "rotated buffer");
        Ok(path)
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.cursor.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Join lines into one newline-terminated block.
pub(crate) fn encode(lines: &[String]) -> Vec<u8> {
    let total = lines.iter().map(|line| line.len() + 1).sum();
    let mut bytes = Vec::with_capacity(total);
    for line in lines {
        bytes.extend_from_slice(line.as_bytes());
        bytes.push(b'\n');
    }
    bytes
}

/// Remove whatever is at `dir` and create it again, empty.
pub fn recreate_dir(dir: &Path) -> io::Result<()> {
    match std::fs::symlink_metadata(dir) {
        Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(dir)?,
        Ok(_) => std::fs::remove_file(dir)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    std::fs::create_dir_all(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{} line {}", prefix, i)).collect()
    }

    #[test]
    fn test_backup_count_is_coerced() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(RotationEngine::new(dir.path(), 0).backup_count(), 2);
        assert_eq!(RotationEngine::new(dir.path(), 1).backup_count(), 2);
        assert_eq!(RotationEngine::new(dir.path(), 5).backup_count(), 5);
    }

    #[test]
    fn test_rotate_writes_slot_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let engine = RotationEngine::new(dir.path(), 3);

        let batch = lines("first", 4);
        let path = engine.rotate(&batch).unwrap().expect("written");
        assert_eq!(path, dir.path().join("0.log"));
        assert_eq!(engine.cursor(), 1);

        let content = std::fs::read_to_string(&path).unwrap();
        let written: Vec<_> = content.lines().collect();
        assert_eq!(written, batch);
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let engine = RotationEngine::new(dir.path(), 2);

        assert!(engine.rotate(&[]).unwrap().is_none());
        assert_eq!(engine.cursor(), 0);
        assert!(!engine.slot_path(0).exists());
    }

    #[test]
    fn test_cursor_wraps_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let engine = RotationEngine::new(dir.path(), 3);

        for round in 0..3 {
            engine.rotate(&lines(&format!("round{}", round), 2)).unwrap();
        }
        assert_eq!(engine.cursor(), 0);

        engine.rotate(&lines("wrapped", 1)).unwrap();
        assert_eq!(engine.cursor(), 1);

        let slot0 = std::fs::read_to_string(engine.slot_path(0)).unwrap();
        assert_eq!(slot0, "wrapped line 0\n");
        let slot1 = std::fs::read_to_string(engine.slot_path(1)).unwrap();
        assert!(slot1.starts_with("round1"));

        let files = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(files, 3);
    }

    #[test]
    fn test_failed_rotation_keeps_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        let engine = RotationEngine::new(&missing, 2);

        assert!(engine.rotate(&lines("lost", 2)).is_err());
        assert_eq!(engine.cursor(), 0);
    }

    #[test]
    fn test_recreate_dir_clears_contents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("logs");
        std::fs::create_dir_all(target.join("nested")).unwrap();
        std::fs::write(target.join("0.log"), "stale\n").unwrap();

        recreate_dir(&target).unwrap();
        assert!(target.is_dir());
        assert_eq!(std::fs::read_dir(&target).unwrap().count(), 0);

        let file_target = dir.path().join("plain");
        std::fs::write(&file_target, "not a dir").unwrap();
        recreate_dir(&file_target).unwrap();
        assert!(file_target.is_dir());
    }
}
