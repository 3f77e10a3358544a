//! Verification rendering: reconstruct the decoded foreground and draw
//! whole-object boxes over the source frame, for eyeballing a decode against
//! the render it came from.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::mask;
use crate::types::{Rle, SceneMasks, WHOLE_OBJECT_KEY};

const BOX_COLOR: Rgb<u8> = Rgb([69, 139, 0]);
const FOREGROUND_TINT: Rgb<u8> = Rgb([180, 0, 0]);

/// Union of every object's whole-object mask, at the given frame dimensions.
pub fn scene_foreground(masks: &SceneMasks, height: u32, width: u32) -> Rle {
    let rles: Vec<Rle> = masks
        .0
        .values()
        .filter_map(|record| record.parts.get(WHOLE_OBJECT_KEY))
        .map(|part| mask::rle_from_string(part.rle(), height, width))
        .collect();
    if rles.is_empty() {
        return Rle {
            h: height,
            w: width,
            counts: vec![height * width],
        };
    }
    mask::merge(&rles, false)
}

/// Compose the verification image: darken the render, tint every decoded
/// foreground pixel, and outline each whole-object box with a 2 px frame.
pub fn overlay(img: &RgbImage, masks: &SceneMasks) -> RgbImage {
    let (width, height) = img.dimensions();
    let mut out = RgbImage::from_fn(width, height, |x, y| {
        let p = img.get_pixel(x, y);
        Rgb([p[0] / 2, p[1] / 2, p[2] / 2])
    });

    let foreground = mask::decode(&scene_foreground(masks, height, width));
    for (i, on) in foreground.iter().enumerate() {
        if *on {
            let x = (i % width as usize) as u32;
            let y = (i / width as usize) as u32;
            out.put_pixel(x, y, FOREGROUND_TINT);
        }
    }

    for record in masks.0.values() {
        if let Some(part) = record.parts.get(WHOLE_OBJECT_KEY) {
            let [x, y, w, h] = part.bbox();
            if w == 0 || h == 0 {
                continue;
            }
            draw_hollow_rect_mut(
                &mut out,
                Rect::at(x as i32, y as i32).of_size(w, h),
                BOX_COLOR,
            );
            if w > 2 && h > 2 {
                draw_hollow_rect_mut(
                    &mut out,
                    Rect::at(x as i32 + 1, y as i32 + 1).of_size(w - 2, h - 2),
                    BOX_COLOR,
                );
            }
        }
    }
    out
}
