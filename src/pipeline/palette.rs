use image::Rgb;

/// Box and label colors, indexed by class id modulo the palette length.
pub const COLOR_PALETTE: [Rgb<u8>; 12] = [
    Rgb([0, 0, 255]),     // blue
    Rgb([0, 255, 0]),     // green
    Rgb([255, 0, 0]),     // red
    Rgb([0, 255, 255]),   // cyan
    Rgb([255, 255, 0]),   // yellow
    Rgb([255, 0, 255]),   // magenta
    Rgb([0, 0, 128]),     // navy
    Rgb([0, 128, 0]),     // dark green
    Rgb([128, 0, 0]),     // maroon
    Rgb([0, 128, 128]),   // teal
    Rgb([128, 128, 0]),   // olive
    Rgb([128, 0, 128]),   // purple
];

/// Color used to draw detections of `class_id`. Ids 12 apart share a color.
pub fn get_color(class_id: usize) -> Rgb<u8> {
    COLOR_PALETTE[class_id % COLOR_PALETTE.len()]
}
