//! Overlay drawing: face rectangles and name labels.
//!
//! Labels are rendered with a built-in 5x7 bitmap font so no font asset
//! ships with the library; text is uppercased since the font carries only
//! capitals, digits and basic punctuation.

use crate::types::FaceBox;
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

pub const BOX_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);
pub const LABEL_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

const BOX_THICKNESS: i32 = 2;
const GLYPH_ROWS: usize = 7;
const GLYPH_COLS: i32 = 5;
const GLYPH_ADVANCE: i32 = GLYPH_COLS + 1;
const TEXT_SCALE: i32 = 2;

/// Draw a green outline around a face box. The box must already be
/// clamped to the frame; the thickness is drawn inward so the outline
/// stays inside it.
pub fn draw_face_box(img: &mut RgbaImage, face: &FaceBox) {
    for inset in 0..BOX_THICKNESS {
        let width = face.width as i64 - 2 * i64::from(inset);
        let height = face.height as i64 - 2 * i64::from(inset);
        if width < 1 || height < 1 {
            break;
        }
        let rect = Rect::at(face.x + inset, face.y + inset).of_size(width as u32, height as u32);
        draw_hollow_rect_mut(img, rect, BOX_COLOR);
    }
}

/// Draw label text with its top-left corner at (x, y). Pixels falling
/// outside the frame are dropped. An empty label draws nothing.
pub fn draw_label(img: &mut RgbaImage, x: i32, y: i32, text: &str) {
    let mut cursor_x = x;
    for ch in text.chars() {
        draw_glyph(img, cursor_x, y, ch, TEXT_SCALE, LABEL_COLOR);
        cursor_x += GLYPH_ADVANCE * TEXT_SCALE;
    }
}

fn draw_glyph(img: &mut RgbaImage, x: i32, y: i32, ch: char, scale: i32, color: Rgba<u8>) {
    let bitmap = glyph(ch.to_ascii_uppercase());
    for (row, bits) in bitmap.iter().enumerate() {
        for col in 0..GLYPH_COLS {
            if (bits >> (GLYPH_COLS - 1 - col)) & 1 == 0 {
                continue;
            }
            for dy in 0..scale {
                for dx in 0..scale {
                    let px = x + col * scale + dx;
                    let py = y + row as i32 * scale + dy;
                    if px >= 0
                        && py >= 0
                        && px < img.width() as i32
                        && py < img.height() as i32
                    {
                        img.put_pixel(px as u32, py as u32, color);
                    }
                }
            }
        }
    }
}

/// 5x7 glyph rows, most significant of the low 5 bits leftmost.
/// Unknown characters render as blank space.
fn glyph(ch: char) -> [u8; GLYPH_ROWS] {
    match ch {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00110, 0b00110],
        '-' => [0b00000, 0b00000, 0b00000, 0b01110, 0b00000, 0b00000, 0b00000],
        _ => [0; GLYPH_ROWS],
    }
}
