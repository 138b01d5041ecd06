use std::sync::{Mutex, MutexGuard};

/// Formatted lines waiting to be persisted by a rotation.
///
/// `append` never touches the filesystem. When an append fills the buffer, the
/// full batch is taken out in the same critical section, so the length never
/// exceeds the capacity and no line can be handed out twice.
#[derive(Debug)]
pub struct BufferStore {
    lines: Mutex<Vec<String>>,
    capacity: usize,
}

impl BufferStore {
    /// Create an empty store. `capacity` must be positive.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "buffer capacity must be positive");
        Self {
            lines: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append a line.
    ///
    /// Returns the sealed batch when this append brought the fill count up to
    /// the capacity; the store is empty again afterwards.
    pub fn append(&self, line: String) -> Option<Vec<String>> {
        let mut lines = self.lock();
        lines.push(line);
        if lines.len() >= self.capacity {
            Some(take(&mut lines, self.capacity))
        } else {
            None
        }
    }

    /// Take everything currently buffered and reset the fill count to zero.
    pub fn drain(&self) -> Vec<String> {
        let mut lines = self.lock();
        take(&mut lines, self.capacity)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        // A panic while holding the lock cannot leave a Vec half-updated.
        self.lines.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn take(lines: &mut Vec<String>, capacity: usize) -> Vec<String> {
    std::mem::replace(lines, Vec::with_capacity(capacity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_append_seals_at_capacity() {
        let store = BufferStore::new(3);
        assert!(store.append("a".to_string()).is_none());
        assert!(store.append("b".to_string()).is_none());
        assert_eq!(store.len(), 2);

        let batch = store.append("c".to_string()).expect("full batch");
        assert_eq!(batch, vec!["a", "b", "c"]);
        assert!(store.is_empty());

        assert!(store.append("d".to_string()).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_capacity_one_seals_every_line() {
        let store = BufferStore::new(1);
        assert_eq!(store.append("x".to_string()), Some(vec!["x".to_string()]));
        assert_eq!(store.append("y".to_string()), Some(vec!["y".to_string()]));
        assert!(store.is_empty());
    }

    #[test]
    fn test_drain_resets() {
        let store = BufferStore::new(10);
        store.append("one".to_string());
        store.append("two".to_string());

        assert_eq!(store.drain(), vec!["one", "two"]);
        assert!(store.drain().is_empty());
        assert_eq!(store.capacity(), 10);
    }

    #[test]
    fn test_concurrent_appends_are_drained_exactly_once() {
        let store = Arc::new(BufferStore::new(7));
        let handles: Vec<_> = (0..16)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let mut sealed = Vec::new();
                    for i in 0..50 {
                        if let Some(batch) = store.append(format!("{}-{}", t, i)) {
                            assert_eq!(batch.len(), 7);
                            sealed.extend(batch);
                        }
                        assert!(store.len() <= 7);
                    }
                    sealed
                })
            })
            .collect();

        let mut all: Vec<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.extend(store.drain());

        assert_eq!(all.len(), 16 * 50);
        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(unique.len(), all.len());
    }
}
