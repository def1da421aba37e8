//! An in-memory record store.
//!
//! Backs the capability tests and demos; real deployments implement
//! [`RecordStore`] over their storage engine instead. Records are keyed by
//! an auto-assigned integer written into the record's `id` field on first
//! save.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde_json::{json, Value};

use crate::record::{Record, RecordStore, RecordType, StoreError};

/// An in-memory [`RecordStore`] for tests and demos.
///
/// # Example
///
/// ```rust,ignore
/// let store: MemoryStore<Widget> = MemoryStore::new();
/// let mut record = store.new_record();
/// record.set_field("name", json!("spanner"));
/// let id = store.save(&mut record)?;
/// assert_eq!(store.get(id).unwrap().get_field("name"), Some(json!("spanner")));
/// ```
#[derive(Debug)]
pub struct MemoryStore<R> {
    records: Mutex<BTreeMap<i64, R>>,
    next_id: Mutex<i64>,
    writes: AtomicU64,
}

impl<R> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> MemoryStore<R> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
            next_id: Mutex::new(1),
            writes: AtomicU64::new(0),
        }
    }

    /// Returns the number of writes performed, for asserting lazy-update
    /// behavior in tests.
    #[must_use]
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }
}

impl<R> RecordStore for MemoryStore<R>
where
    R: Record + RecordType + Clone + Default + Send + Sync + 'static,
{
    type Rec = R;

    fn new_record(&self) -> R {
        R::default()
    }

    fn get(&self, id: i64) -> Option<R> {
        self.records.lock().expect("store lock").get(&id).cloned()
    }

    fn all(&self) -> Vec<R> {
        self.records
            .lock()
            .expect("store lock")
            .values()
            .cloned()
            .collect()
    }

    fn count(&self) -> u64 {
        self.records.lock().expect("store lock").len() as u64
    }

    fn save(&self, record: &mut R) -> Result<i64, StoreError> {
        let id = match record.get_field("id").and_then(|v| v.as_i64()) {
            Some(id) => id,
            None => {
                let mut next = self.next_id.lock().expect("id lock");
                let id = *next;
                *next += 1;
                record.set_field("id", json!(id));
                id
            }
        };

        self.records
            .lock()
            .expect("store lock")
            .insert(id, record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }

    fn delete(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self
            .records
            .lock()
            .expect("store lock")
            .remove(&id)
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{FieldKind, RecordField};

    #[derive(Debug, Clone, Default)]
    struct Note {
        values: BTreeMap<String, Value>,
    }

    impl RecordType for Note {
        fn record_name() -> &'static str {
            "note"
        }
        fn record_fields() -> Vec<RecordField> {
            vec![
                RecordField::new("id", FieldKind::AutoId),
                RecordField::new("text", FieldKind::Text),
            ]
        }
    }

    impl Record for Note {
        fn get_field(&self, name: &str) -> Option<Value> {
            self.values.get(name).cloned()
        }
        fn set_field(&mut self, name: &str, value: Value) -> bool {
            self.values.insert(name.to_string(), value);
            true
        }
    }

    #[test]
    fn test_save_assigns_sequential_ids() {
        let store: MemoryStore<Note> = MemoryStore::new();
        let mut a = store.new_record();
        let mut b = store.new_record();
        assert_eq!(store.save(&mut a).unwrap(), 1);
        assert_eq!(store.save(&mut b).unwrap(), 2);
        assert_eq!(a.get_field("id"), Some(json!(1)));
        assert_eq!(store.count(), 2);
    }

    #[test]
    fn test_save_existing_id_overwrites() {
        let store: MemoryStore<Note> = MemoryStore::new();
        let mut note = store.new_record();
        note.set_field("text", json!("first"));
        let id = store.save(&mut note).unwrap();

        note.set_field("text", json!("second"));
        assert_eq!(store.save(&mut note).unwrap(), id);
        assert_eq!(store.count(), 1);
        assert_eq!(store.get(id).unwrap().get_field("text"), Some(json!("second")));
    }

    #[test]
    fn test_delete() {
        let store: MemoryStore<Note> = MemoryStore::new();
        let mut note = store.new_record();
        let id = store.save(&mut note).unwrap();
        assert!(store.delete(id).unwrap());
        assert!(!store.delete(id).unwrap());
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_all_in_id_order() {
        let store: MemoryStore<Note> = MemoryStore::new();
        for text in ["a", "b", "c"] {
            let mut note = store.new_record();
            note.set_field("text", json!(text));
            store.save(&mut note).unwrap();
        }
        let texts: Vec<_> = store
            .all()
            .iter()
            .map(|n| n.get_field("text").unwrap())
            .collect();
        assert_eq!(texts, vec![json!("a"), json!("b"), json!("c")]);
    }
}
