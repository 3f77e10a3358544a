use image::{Rgb, RgbImage};

use scenemask_rs::types::{WHOLE_OBJECT, WHOLE_OBJECT_KEY};
use scenemask_rs::{codec, extract_scene, mask, viz, IdentityTable, SceneMasks};

/// Gamma-encode a linear identity color the way the renderer would before
/// 8-bit storage.
fn rendered(object_index: u32, part_index: i32) -> Rgb<u8> {
    let (r, g, b) = codec::encode_identity(object_index, part_index);
    let byte = |y: f64| (codec::delinearize(y) * 255.0).round() as u8;
    Rgb([byte(r), byte(g), byte(b)])
}

fn fill(img: &mut RgbImage, x0: u32, y0: u32, w: u32, h: u32, px: Rgb<u8>) {
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            img.put_pixel(x, y, px);
        }
    }
}

/// An 8x6 frame with a two-part car and a whole-coded bike:
///   car.door        (part 7) at x 0..4, y 0..3
///   car.wheel_front (part 0) at x 0..2, y 3..5
///   bike (whole-object code)  at x 5..8, y 2..5
fn test_frame() -> (RgbImage, IdentityTable) {
    let mut img = RgbImage::from_pixel(8, 6, Rgb([0, 0, 0]));
    fill(&mut img, 0, 0, 4, 3, rendered(0, 7));
    fill(&mut img, 0, 3, 2, 2, rendered(0, 0));
    fill(&mut img, 5, 2, 3, 3, rendered(1, WHOLE_OBJECT));

    let table = IdentityTable::from_json_str(
        r#"{
            "1": [0, -1, "car"],
            "2": [0, 7, "car.door"],
            "3": [0, 0, "car.wheel_front"],
            "4": [1, -1, "bike"]
        }"#,
    )
    .unwrap();
    (img, table)
}

#[test]
fn test_records_and_boxes() {
    let (img, table) = test_frame();
    let masks = extract_scene(&img, &table);

    assert_eq!(masks.len(), 2);

    let car = masks.get(0).unwrap();
    assert_eq!(car.info, "car");
    assert_eq!(car.parts.len(), 3);
    assert_eq!(car.parts[WHOLE_OBJECT_KEY].bbox(), [0, 0, 4, 5]);
    assert_eq!(car.parts["door"].bbox(), [0, 0, 4, 3]);
    assert_eq!(car.parts["wheel_front"].bbox(), [0, 3, 2, 2]);

    let bike = masks.get(1).unwrap();
    assert_eq!(bike.info, "bike");
    assert_eq!(bike.parts.len(), 1);
    assert_eq!(bike.parts[WHOLE_OBJECT_KEY].bbox(), [5, 2, 3, 3]);
}

#[test]
fn test_run_length_strings() {
    let (img, table) = test_frame();
    let masks = extract_scene(&img, &table);

    let car = masks.get(0).unwrap();
    assert_eq!(
        car.parts[WHOLE_OBJECT_KEY].rle(),
        "0,4,4,4,4,4,4,2,6,2,14"
    );
    assert_eq!(car.parts["door"].rle(), "0,4,4,4,4,4,28");
    assert_eq!(car.parts["wheel_front"].rle(), "24,2,6,2,14");
    assert_eq!(masks.get(1).unwrap().parts[WHOLE_OBJECT_KEY].rle(), "21,3,5,3,5,3,8");

    // Every stored string must decode back to a full-frame mask.
    for record in masks.0.values() {
        for part in record.parts.values() {
            let rle = mask::rle_from_string(part.rle(), 6, 8);
            let total: u64 = rle.counts.iter().map(|&c| u64::from(c)).sum();
            assert_eq!(total, 48);
            assert_eq!(mask::encode(&mask::decode(&rle), 6, 8), rle);
        }
    }
}

#[test]
fn test_part_masks_are_disjoint_and_within_object() {
    let (img, table) = test_frame();
    let masks = extract_scene(&img, &table);
    let car = masks.get(0).unwrap();

    let rle_of = |key: &str| mask::rle_from_string(car.parts[key].rle(), 6, 8);
    let door = rle_of("door");
    let wheel = rle_of("wheel_front");
    let obj = rle_of(WHOLE_OBJECT_KEY);

    // Distinct entries never overlap.
    let both = mask::merge(&[door.clone(), wheel.clone()], true);
    assert_eq!(mask::area(&both), 0);

    // The parts union exactly covers the whole-object mask here, and is in
    // any case a subset of it.
    let union = mask::merge(&[door.clone(), wheel.clone()], false);
    assert_eq!(mask::decode(&union), mask::decode(&obj));
    let outside = mask::merge(&[door, wheel], false);
    assert_eq!(
        mask::area(&mask::merge(&[outside, obj.clone()], false)),
        mask::area(&obj)
    );
}

#[test]
fn test_scene_foreground_union() {
    let (img, table) = test_frame();
    let masks = extract_scene(&img, &table);

    let foreground = viz::scene_foreground(&masks, 6, 8);
    // car covers 12 + 4 px, bike covers 9 px; all disjoint.
    assert_eq!(mask::area(&foreground), 25);

    let overlay = viz::overlay(&img, &masks);
    assert_eq!(overlay.dimensions(), (8, 6));
    // The whole-object box corner is outlined.
    assert_eq!(overlay.get_pixel(0, 0), &Rgb([69, 139, 0]));
    // Background pixels are the darkened source.
    assert_eq!(overlay.get_pixel(4, 5), &Rgb([0, 0, 0]));
}

#[test]
fn test_overlay_tints_interior_foreground() {
    // A mask large enough that its interior clears the 2 px box frame.
    let mut img = RgbImage::from_pixel(10, 10, Rgb([200, 200, 200]));
    fill(&mut img, 2, 2, 6, 6, rendered(0, WHOLE_OBJECT));
    let table = IdentityTable::from_json_str(r#"{"1": [0, -1, "car"]}"#).unwrap();
    let masks = extract_scene(&img, &table);
    assert_eq!(masks.get(0).unwrap().parts[WHOLE_OBJECT_KEY].bbox(), [2, 2, 6, 6]);

    let overlay = viz::overlay(&img, &masks);
    assert_eq!(overlay.get_pixel(4, 4), &Rgb([180, 0, 0]));
    assert_eq!(overlay.get_pixel(2, 2), &Rgb([69, 139, 0]));
    assert_eq!(overlay.get_pixel(0, 0), &Rgb([100, 100, 100]));
}

#[test]
fn test_serialized_record_shape() {
    let (img, table) = test_frame();
    let masks = extract_scene(&img, &table);

    let value = serde_json::to_value(&masks).unwrap();
    assert_eq!(value["0"]["info"], "car");
    assert_eq!(value["0"]["door"][0], serde_json::json!([0, 0, 4, 3]));
    assert_eq!(value["0"]["door"][1], "0,4,4,4,4,4,28");
    assert_eq!(value["1"]["info"], "bike");
    assert_eq!(value["1"]["obj"][1], "21,3,5,3,5,3,8");

    let back: SceneMasks = serde_json::from_value(value).unwrap();
    assert_eq!(back, masks);
}

#[test]
fn test_noisy_channels_still_decode() {
    let (mut img, table) = test_frame();
    // Nudge every painted channel by one code value, simulating renderer
    // noise well inside the +-0.004 tolerance.
    for px in img.pixels_mut() {
        for c in px.0.iter_mut() {
            if *c > 0 {
                *c = c.saturating_add(1);
            }
        }
    }
    let masks = extract_scene(&img, &table);
    assert_eq!(masks.get(0).unwrap().parts["door"].bbox(), [0, 0, 4, 3]);
    assert_eq!(masks.get(1).unwrap().parts[WHOLE_OBJECT_KEY].bbox(), [5, 2, 3, 3]);
}
