//! The color codec: bidirectional mapping between flat-shaded pixel colors
//! and (object, part) identities.
//!
//! The producing side paints every surface of pass `i` with a flat color
//! whose channels carry small integers on fixed quantization grids: the red
//! channel addresses the object slot in steps of 0.05, green and blue address
//! the part group and part sub-index in steps of 0.1. The renderer
//! gamma-encodes those values on the way to the output image, so decoding
//! first applies the inverse sRGB transfer function, then snaps each channel
//! back to its grid. All comparisons happen on integer slot indices, never on
//! floats.

use crate::types::WHOLE_OBJECT;

/// Quantization step separating object slots on the red channel.
pub const OBJECT_STEP: f64 = 0.05;
/// Quantization step for the two part-discriminating channels.
pub const PART_STEP: f64 = 0.1;
/// Number of distinct object slots the red channel can carry.
pub const MAX_OBJECTS: u32 = 20;
/// Part indices decompose as `group * PART_SUBS + sub`.
pub const PART_GROUPS: i32 = 4;
pub const PART_SUBS: i32 = 5;
/// Upper bound (exclusive) on encodable part indices.
pub const MAX_PARTS: i32 = PART_GROUPS * PART_SUBS;

/// Inverse of the sRGB electro-optical transfer function.
///
/// Undoes the renderer's gamma encoding so the original flat code value can
/// be recovered from a normalized [0, 1] channel sample.
pub fn linearize(x: f64) -> f64 {
    if x <= 0.04045 {
        x / 12.92
    } else {
        ((x + 0.055) / 1.055).powf(2.4)
    }
}

/// Forward sRGB transfer function: the encoding the renderer applies to a
/// linear channel value before 8-bit storage. The producing side of
/// [`linearize`]; used to synthesize renderer-like pixels in tests.
pub fn delinearize(y: f64) -> f64 {
    if y <= 0.0031308 {
        y * 12.92
    } else {
        1.055 * y.powf(1.0 / 2.4) - 0.055
    }
}

/// Snap a linearized channel value to its quantization grid.
///
/// Returns the nearest slot index; slot 0 (and anything beyond the u8 range)
/// means background/unassigned.
pub fn quantize(y: f64, step: f64) -> u8 {
    let slot = (y / step).round();
    if (0.0..=u8::MAX as f64).contains(&slot) {
        slot as u8
    } else {
        0
    }
}

/// A pixel decoded to quantization slots, one per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelCode {
    pub object_slot: u8,
    pub group_slot: u8,
    pub sub_slot: u8,
}

impl PixelCode {
    /// Whether this pixel carries the given identity. Whole-object identities
    /// compare the object slot only; the part channels are left unconstrained.
    pub fn matches(&self, object_index: u32, part_index: i32) -> bool {
        if u32::from(self.object_slot) != object_index + 1 {
            return false;
        }
        if part_index == WHOLE_OBJECT {
            return true;
        }
        i32::from(self.group_slot) == part_index / PART_SUBS + 1
            && i32::from(self.sub_slot) == part_index % PART_SUBS + 1
    }

    /// Object index carried by the red channel, if the slot is in range.
    pub fn object_index(&self) -> Option<u32> {
        let slot = u32::from(self.object_slot);
        (1..=MAX_OBJECTS).contains(&slot).then(|| slot - 1)
    }

    /// Part index recombined from the group and sub channels, if both slots
    /// are in range.
    pub fn part_index(&self) -> Option<i32> {
        let group = i32::from(self.group_slot) - 1;
        let sub = i32::from(self.sub_slot) - 1;
        if (0..PART_GROUPS).contains(&group) && (0..PART_SUBS).contains(&sub) {
            Some(group * PART_SUBS + sub)
        } else {
            None
        }
    }
}

/// Decode one normalized RGB sample into quantization slots.
pub fn decode_pixel(r: f64, g: f64, b: f64) -> PixelCode {
    PixelCode {
        object_slot: quantize(linearize(r), OBJECT_STEP),
        group_slot: quantize(linearize(g), PART_STEP),
        sub_slot: quantize(linearize(b), PART_STEP),
    }
}

/// Flat linear color the producing side assigns to an identity. Whole-object
/// entries use only the object channel; the part channels stay at zero.
pub fn encode_identity(object_index: u32, part_index: i32) -> (f64, f64, f64) {
    let r = OBJECT_STEP * f64::from(object_index + 1);
    if part_index == WHOLE_OBJECT {
        (r, 0.0, 0.0)
    } else {
        let g = PART_STEP * f64::from(part_index / PART_SUBS + 1);
        let b = PART_STEP * f64::from(part_index % PART_SUBS + 1);
        (r, g, b)
    }
}
