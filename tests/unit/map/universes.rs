use super::*;
use crate::foundation::color::Color;
use crate::map::pixel::{ColorOrder, Pixel, PixelType};

fn map_of(pixels: Vec<Pixel>) -> PixelMap {
    PixelMap::new(pixels).unwrap()
}

#[test]
fn grb_pixel_lands_at_expected_offsets() {
    let mut map = map_of(vec![
        Pixel::new(0, 0, 1, 2).with_color_order(ColorOrder::Grb),
    ]);
    map.iter_mut()
        .next()
        .unwrap()
        .set_color(Color::rgb(10, 20, 30));

    let mut index = UniverseIndex::new(&map);
    let buffer = index.pack(1, &map);

    assert_eq!(&buffer[3..6], &[20, 10, 30]);
    for (i, b) in buffer.iter().enumerate() {
        if !(3..6).contains(&i) {
            assert_eq!(*b, 0, "byte {i} should be zero");
        }
    }
}

#[test]
fn rgbw_pixel_occupies_four_channels() {
    let mut map = map_of(vec![Pixel::new(0, 0, 1, 1).with_pixel_type(PixelType::Rgbw)]);
    map.iter_mut().next().unwrap().set_color(Color {
        r: 1,
        g: 2,
        b: 3,
        w: 4,
    });

    let mut index = UniverseIndex::new(&map);
    let buffer = index.pack(1, &map);

    assert_eq!(&buffer[0..4], &[1, 2, 3, 4]);
    assert!(buffer[4..].iter().all(|&b| b == 0));
}

#[test]
fn rgb_packing_roundtrip() {
    let mut map = map_of(vec![Pixel::new(0, 0, 1, 7)]);
    map.iter_mut()
        .next()
        .unwrap()
        .set_color(Color::rgb(200, 150, 100));

    let mut index = UniverseIndex::new(&map);
    let buffer = index.pack(1, &map);

    let pos = (7 - 1) * 3;
    assert_eq!(
        (buffer[pos], buffer[pos + 1], buffer[pos + 2]),
        (200, 150, 100)
    );
}

#[test]
fn overflowing_pixel_is_skipped() {
    // RGBW at position 129 would need channels 513..516.
    let mut map = map_of(vec![
        Pixel::new(0, 0, 1, 129).with_pixel_type(PixelType::Rgbw),
        Pixel::new(0, 1, 1, 1),
    ]);
    for p in map.iter_mut() {
        p.set_color(Color::rgb(255, 255, 255));
    }

    let mut index = UniverseIndex::new(&map);
    let buffer = index.pack(1, &map);

    assert_eq!(&buffer[0..3], &[255, 255, 255]);
    assert!(buffer[3..].iter().all(|&b| b == 0));
}

#[test]
fn unknown_universe_packs_to_zeroes() {
    let map = map_of(vec![Pixel::new(0, 0, 1, 1)]);
    let mut index = UniverseIndex::new(&map);
    assert!(index.pack(9, &map).iter().all(|&b| b == 0));
}

#[test]
fn pixels_ordered_by_channel_position() {
    let mut map = map_of(vec![Pixel::new(0, 0, 1, 2), Pixel::new(0, 1, 1, 1)]);
    let colors = [Color::rgb(9, 9, 9), Color::rgb(1, 1, 1)];
    for (p, c) in map.iter_mut().zip(colors) {
        p.set_color(c);
    }

    let mut index = UniverseIndex::new(&map);
    let buffer = index.pack(1, &map);
    assert_eq!(&buffer[0..3], &[1, 1, 1]);
    assert_eq!(&buffer[3..6], &[9, 9, 9]);
}
