//! The mask extraction engine.
//!
//! A frame is decoded in two stages. The image is first reduced, once, to
//! three per-pixel slot planes (object, part group, part sub), the explicit
//! layer-array form of the channel comparisons every table entry needs. Each
//! table entry then composes its boolean mask from those planes, boxes it,
//! and run-length encodes it; entries are independent, so that stage runs in
//! parallel across the table.

use std::collections::BTreeMap;

use image::RgbImage;
use rayon::prelude::*;

use crate::codec;
use crate::error::{Error, Result};
use crate::mask;
use crate::table::IdentityTable;
use crate::types::{ObjectRecord, PartMask, PassEntry, SceneMasks};

/// Per-pixel quantization slots for one frame, decoded once and shared by
/// every table entry.
pub struct LabelPlanes {
    width: u32,
    height: u32,
    object: Vec<u8>,
    group: Vec<u8>,
    sub: Vec<u8>,
}

impl LabelPlanes {
    /// Decode an 8-bit RGB render into quantization slots.
    pub fn from_image(img: &RgbImage) -> Self {
        let (width, height) = img.dimensions();
        let n = (width as usize) * (height as usize);
        let mut planes = LabelPlanes {
            width,
            height,
            object: Vec::with_capacity(n),
            group: Vec::with_capacity(n),
            sub: Vec::with_capacity(n),
        };
        for px in img.pixels() {
            planes.push_pixel(
                f64::from(px[0]) / 255.0,
                f64::from(px[1]) / 255.0,
                f64::from(px[2]) / 255.0,
            );
        }
        planes
    }

    /// Decode a normalized interleaved RGB buffer with declared dimensions.
    ///
    /// The buffer length is a precondition, not negotiated: a mismatch with
    /// `width * height * 3` is fatal before any decoding.
    pub fn from_rgb_f64(width: u32, height: u32, rgb: &[f64]) -> Result<Self> {
        let n = (width as usize) * (height as usize);
        let expected = n * 3;
        if rgb.len() != expected {
            return Err(Error::DimensionMismatch {
                width,
                height,
                expected,
                actual: rgb.len(),
            });
        }
        let mut planes = LabelPlanes {
            width,
            height,
            object: Vec::with_capacity(n),
            group: Vec::with_capacity(n),
            sub: Vec::with_capacity(n),
        };
        for px in rgb.chunks_exact(3) {
            planes.push_pixel(px[0], px[1], px[2]);
        }
        Ok(planes)
    }

    fn push_pixel(&mut self, r: f64, g: f64, b: f64) {
        let code = codec::decode_pixel(r, g, b);
        self.object.push(code.object_slot);
        self.group.push(code.group_slot);
        self.sub.push(code.sub_slot);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Boolean mask of the pixels carrying one table entry's identity.
    ///
    /// Whole-object entries compare the object plane only; part entries
    /// intersect all three planes. Background pixels (slot 0) never match
    /// because table object slots start at 1.
    fn entry_mask(&self, entry: &PassEntry) -> Vec<bool> {
        let obj_slot = (entry.object_index + 1) as u8;
        if entry.is_whole_object() {
            self.object.iter().map(|&o| o == obj_slot).collect()
        } else {
            let group_slot = (entry.part_index / codec::PART_SUBS + 1) as u8;
            let sub_slot = (entry.part_index % codec::PART_SUBS + 1) as u8;
            self.object
                .iter()
                .zip(&self.group)
                .zip(&self.sub)
                .map(|((&o, &g), &s)| o == obj_slot && g == group_slot && s == sub_slot)
                .collect()
        }
    }
}

/// Decode one rendered frame against its identity table.
///
/// Convenience wrapper over [`LabelPlanes::from_image`] +
/// [`extract_from_planes`].
pub fn extract_scene(img: &RgbImage, table: &IdentityTable) -> SceneMasks {
    extract_from_planes(&LabelPlanes::from_image(img), table)
}

/// Build every table entry's mask, box it, run-length encode it, and
/// assemble the per-object records.
///
/// Entries are processed in parallel; results are keyed by object index and
/// record key, so ordering between entries does not matter.
pub fn extract_from_planes(planes: &LabelPlanes, table: &IdentityTable) -> SceneMasks {
    let decoded: Vec<(&PassEntry, PartMask)> = table
        .entries()
        .par_iter()
        .map(|entry| {
            let bits = planes.entry_mask(entry);
            let rle = mask::encode(&bits, planes.height(), planes.width());
            let bbox = mask::to_bbox(&rle);
            (entry, PartMask(bbox, mask::rle_to_string(&rle)))
        })
        .collect();

    let mut records: BTreeMap<u32, ObjectRecord> = BTreeMap::new();
    for (entry, part) in decoded {
        let record = records
            .entry(entry.object_index)
            .or_insert_with(|| ObjectRecord {
                info: entry.object_name().to_string(),
                parts: BTreeMap::new(),
            });
        record.parts.insert(entry.record_key().to_string(), part);
    }
    SceneMasks(records)
}
