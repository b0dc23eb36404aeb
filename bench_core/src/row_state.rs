use std::collections::{HashMap, HashSet};
use std::fmt;

use sha2::{Digest, Sha256};

use crate::csv_table::FieldTuple;

const KEY_SEPARATOR: &str = "|";

/// Content-addressed identity of a row: SHA-256 of its fields joined by `|`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowKey([u8; 32]);

impl RowKey {
    pub fn of(fields: &FieldTuple) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(fields.fields().join(KEY_SEPARATOR).as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }
}

impl fmt::Debug for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0[..6] {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowState {
    pub status: String,
    pub fields: FieldTuple,
}

impl RowState {
    pub fn new(status: impl Into<String>, fields: FieldTuple) -> Self {
        Self {
            status: status.into(),
            fields,
        }
    }

    pub fn key(&self) -> RowKey {
        RowKey::of(&self.fields)
    }
}

/// Carries each old row's status over to new rows with identical content.
///
/// The result has one entry per `new` tuple, in the same order. When `old`
/// holds duplicate content the last occurrence supplies the status.
pub fn reconcile(old: &[RowState], new: Vec<FieldTuple>) -> Vec<RowState> {
    let mut previous: HashMap<RowKey, &str> = HashMap::with_capacity(old.len());
    for row in old {
        previous.insert(row.key(), row.status.as_str());
    }
    new.into_iter()
        .map(|fields| {
            let status = previous
                .get(&RowKey::of(&fields))
                .map(|status| status.to_string())
                .unwrap_or_default();
            RowState { status, fields }
        })
        .collect()
}

/// How many rows in `rows` kept the identity of some row in `old`.
pub fn retained_count(old: &[RowState], rows: &[RowState]) -> usize {
    let keys: HashSet<RowKey> = old.iter().map(RowState::key).collect();
    rows.iter().filter(|row| keys.contains(&row.key())).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuple(values: [&str; 3]) -> FieldTuple {
        FieldTuple::from(values.to_vec())
    }

    #[test]
    fn reloading_identical_content_keeps_every_status() {
        let old = vec![
            RowState::new("PASS", tuple(["t1", "a.c", "a.txt"])),
            RowState::new("", tuple(["t2", "b.c", "b.txt"])),
            RowState::new("flaky", tuple(["t3", "c.c", "c.txt"])),
        ];
        let fields: Vec<_> = old.iter().map(|row| row.fields.clone()).collect();
        assert_eq!(reconcile(&old, fields), old);
    }

    #[test]
    fn matching_ignores_position() {
        let old = vec![RowState::new("done", tuple(["A", "B", "C"]))];
        let rows = reconcile(&old, vec![tuple(["X", "Y", "Z"]), tuple(["A", "B", "C"])]);
        assert_eq!(rows[0].status, "");
        assert_eq!(rows[1].status, "done");
    }

    #[test]
    fn any_field_change_resets_status() {
        let old = vec![RowState::new("PASS", tuple(["t1", "a.c", "a.txt"]))];
        let rows = reconcile(&old, vec![tuple(["t1", "a.c", "a2.txt"])]);
        assert_eq!(rows[0].status, "");
        let rows = reconcile(&old, vec![tuple(["t1", "a.c ", "a.txt"])]);
        assert_eq!(rows[0].status, "");
    }

    #[test]
    fn later_duplicates_win() {
        let old = vec![
            RowState::new("first", tuple(["t", "s", "e"])),
            RowState::new("second", tuple(["t", "s", "e"])),
        ];
        let rows = reconcile(&old, vec![tuple(["t", "s", "e"]), tuple(["t", "s", "e"])]);
        assert!(rows.iter().all(|row| row.status == "second"));
    }

    #[test]
    fn empty_previous_state_yields_empty_statuses() {
        let rows = reconcile(&[], vec![tuple(["t1", "src.c", "exp.txt"])]);
        assert_eq!(rows, vec![RowState::new("", tuple(["t1", "src.c", "exp.txt"]))]);
    }

    #[test]
    fn key_depends_on_field_order() {
        assert_ne!(
            RowKey::of(&tuple(["a", "b", "c"])),
            RowKey::of(&tuple(["b", "a", "c"]))
        );
    }

    #[test]
    fn retained_count_counts_identity_matches() {
        let old = vec![RowState::new("x", tuple(["a", "b", "c"]))];
        let rows = reconcile(&old, vec![tuple(["a", "b", "c"]), tuple(["d", "e", "f"])]);
        assert_eq!(retained_count(&old, &rows), 1);
    }
}
