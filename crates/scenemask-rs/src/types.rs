use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sentinel part index marking an identity-table entry that stands for the
/// whole object rather than a specific part.
pub const WHOLE_OBJECT: i32 = -1;

/// Record key under which the whole-object mask is stored.
pub const WHOLE_OBJECT_KEY: &str = "obj";

/// One identity-table row: the (object, part) identity behind a render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassEntry {
    /// 1-based pass index assigned by the renderer.
    pub pass_index: usize,
    pub object_index: u32,
    /// Part index in `0..MAX_PARTS`, or [`WHOLE_OBJECT`].
    pub part_index: i32,
    /// `"<object>.<part>"`, or just `"<object>"` for a whole-object entry.
    pub name: String,
}

impl PassEntry {
    pub fn is_whole_object(&self) -> bool {
        self.part_index == WHOLE_OBJECT
    }

    /// Object name: everything before the first `.` of the entry name.
    pub fn object_name(&self) -> &str {
        self.name.split('.').next().unwrap_or(&self.name)
    }

    /// Part name for a part entry; `None` for whole-object entries and for
    /// part entries whose name lacks the `"object.part"` form.
    pub fn part_name(&self) -> Option<&str> {
        if self.is_whole_object() {
            return None;
        }
        self.name.splitn(2, '.').nth(1).filter(|p| !p.is_empty())
    }

    /// Key under which this entry's mask appears in the object record.
    pub fn record_key(&self) -> &str {
        match self.part_name() {
            Some(part) => part,
            None => WHOLE_OBJECT_KEY,
        }
    }
}

/// Run-length encoding for binary masks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rle {
    pub h: u32,
    pub w: u32,
    /// Run counts over the row-major flattened mask: alternating runs of 0s
    /// and 1s, starting with 0s. Sums to `h * w`.
    pub counts: Vec<u32>,
}

/// Bounding box plus run-length string for one decoded surface.
///
/// Serializes as `[[x, y, w, h], "counts"]`, the pair format stored in scene
/// records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartMask(pub [u32; 4], pub String);

impl PartMask {
    /// Tight `[x, y, width, height]` box; all zeros for an empty mask.
    pub fn bbox(&self) -> [u32; 4] {
        self.0
    }

    /// Comma-separated run lengths over the row-major mask.
    pub fn rle(&self) -> &str {
        &self.1
    }
}

/// Per-object decode result: the object's name plus one [`PartMask`] per
/// visible part, keyed by part name (the whole-object mask sits under
/// [`WHOLE_OBJECT_KEY`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub info: String,
    #[serde(flatten)]
    pub parts: BTreeMap<String, PartMask>,
}

/// Decode result for one rendered frame, keyed by object index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneMasks(pub BTreeMap<u32, ObjectRecord>);

impl SceneMasks {
    pub fn get(&self, object_index: u32) -> Option<&ObjectRecord> {
        self.0.get(&object_index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
