//! Identity-table loading and validation.
//!
//! The renderer writes, next to every frame, a JSON object mapping 1-based
//! pass indices to `[object_index, part_index, name]` triples. The table is
//! the only link between a pixel's decoded color slots and the scene's
//! object/part identities, so it is validated in full before any pixel work:
//! contiguous pass indices, exactly one whole-object entry per referenced
//! object, well-formed part names, and indices the codec can actually encode.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::codec::{MAX_OBJECTS, MAX_PARTS};
use crate::error::{Error, Result};
use crate::types::PassEntry;

/// Wire form of one identity-table row: `[object_index, part_index, name]`.
#[derive(Debug, Clone, Deserialize)]
struct RawEntry(u32, i32, String);

/// The pass-index → identity mapping rendered alongside each frame.
#[derive(Debug, Clone)]
pub struct IdentityTable {
    /// Entries ordered by pass index (entry `i` has pass index `i + 1`).
    entries: Vec<PassEntry>,
    /// object_index -> position of its whole-object entry in `entries`.
    whole_object: HashMap<u32, usize>,
}

impl IdentityTable {
    /// Load and validate an identity-table JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let raw: HashMap<String, RawEntry> = serde_json::from_reader(reader)?;
        Self::from_raw(raw)
    }

    /// Parse and validate an identity table from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let raw: HashMap<String, RawEntry> = serde_json::from_str(s)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: HashMap<String, RawEntry>) -> Result<Self> {
        let mut by_pass = HashMap::with_capacity(raw.len());
        for (key, entry) in raw {
            let pass = key
                .parse::<usize>()
                .ok()
                .filter(|&p| p >= 1)
                .ok_or_else(|| Error::BadPassIndex(key.clone()))?;
            by_pass.insert(pass, entry);
        }

        let mut entries = Vec::with_capacity(by_pass.len());
        for pass in 1..=by_pass.len() {
            let RawEntry(object_index, part_index, name) = by_pass
                .remove(&pass)
                .ok_or(Error::NonContiguousPasses(pass))?;
            entries.push(PassEntry {
                pass_index: pass,
                object_index,
                part_index,
                name,
            });
        }
        Self::new(entries)
    }

    /// Validate and index an ordered entry list.
    pub fn new(entries: Vec<PassEntry>) -> Result<Self> {
        let mut whole_object = HashMap::new();

        for (pos, entry) in entries.iter().enumerate() {
            if entry.object_index >= MAX_OBJECTS {
                return Err(Error::ObjectIndexRange {
                    pass_index: entry.pass_index,
                    object_index: entry.object_index,
                    max: MAX_OBJECTS,
                });
            }
            if entry.is_whole_object() {
                if whole_object.insert(entry.object_index, pos).is_some() {
                    return Err(Error::DuplicateWholeObject(entry.object_index));
                }
            } else {
                if entry.part_index < 0 || entry.part_index >= MAX_PARTS {
                    return Err(Error::PartIndexRange {
                        pass_index: entry.pass_index,
                        part_index: entry.part_index,
                    });
                }
                if entry.part_name().is_none() {
                    return Err(Error::BadEntryName {
                        pass_index: entry.pass_index,
                        name: entry.name.clone(),
                    });
                }
            }
        }

        for entry in &entries {
            if !whole_object.contains_key(&entry.object_index) {
                return Err(Error::MissingWholeObject(entry.object_index));
            }
        }

        Ok(IdentityTable {
            entries,
            whole_object,
        })
    }

    /// All entries, ordered by pass index.
    pub fn entries(&self) -> &[PassEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Object indices referenced by the table, ascending.
    pub fn object_indices(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.whole_object.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// The whole-object entry for an object, if the table references it.
    pub fn whole_object_entry(&self, object_index: u32) -> Option<&PassEntry> {
        self.whole_object
            .get(&object_index)
            .map(|&pos| &self.entries[pos])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_index() {
        let table = IdentityTable::from_json_str(
            r#"{
                "1": [0, -1, "car"],
                "2": [0, 3, "car.wheel_front"],
                "3": [1, -1, "bike"]
            }"#,
        )
        .unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.object_indices(), vec![0, 1]);
        assert_eq!(table.entries()[0].name, "car");
        assert_eq!(table.entries()[1].record_key(), "wheel_front");
        assert_eq!(table.whole_object_entry(1).unwrap().name, "bike");
        assert!(table.whole_object_entry(2).is_none());
    }

    #[test]
    fn test_gap_in_pass_indices_is_rejected() {
        let err = IdentityTable::from_json_str(
            r#"{"1": [0, -1, "car"], "3": [0, 0, "car.wheel"]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::NonContiguousPasses(2)));
    }

    #[test]
    fn test_non_numeric_pass_index_is_rejected() {
        let err =
            IdentityTable::from_json_str(r#"{"zero": [0, -1, "car"]}"#).unwrap_err();
        assert!(matches!(err, Error::BadPassIndex(_)));
    }

    #[test]
    fn test_missing_whole_object_is_rejected() {
        let err = IdentityTable::from_json_str(
            r#"{"1": [0, -1, "car"], "2": [1, 0, "bike.frame"]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::MissingWholeObject(1)));
    }

    #[test]
    fn test_duplicate_whole_object_is_rejected() {
        let err = IdentityTable::from_json_str(
            r#"{"1": [0, -1, "car"], "2": [0, -1, "car"]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateWholeObject(0)));
    }

    #[test]
    fn test_part_entry_without_part_name_is_rejected() {
        let err = IdentityTable::from_json_str(
            r#"{"1": [0, -1, "car"], "2": [0, 0, "car"]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::BadEntryName { pass_index: 2, .. }));
    }

    #[test]
    fn test_out_of_range_indices_are_rejected() {
        let err =
            IdentityTable::from_json_str(r#"{"1": [20, -1, "car"]}"#).unwrap_err();
        assert!(matches!(err, Error::ObjectIndexRange { .. }));

        let err = IdentityTable::from_json_str(
            r#"{"1": [0, -1, "car"], "2": [0, 20, "car.mystery"]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::PartIndexRange { .. }));
    }
}
