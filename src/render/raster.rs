//! Code image rasterization
//!
//! Draws highlighted lines onto an RGBA canvas with an 8x8 bitmap font,
//! then PNG-encodes the result.

use super::highlight::HighlightedLine;
use font8x8::{UnicodeFonts, BASIC_FONTS, BLOCK_FONTS, BOX_FONTS, GREEK_FONTS, LATIN_FONTS};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageResult, Rgba, RgbaImage};

/// Glyph cell size of the bitmap font, before scaling.
const GLYPH_SIZE: u32 = 8;

/// Unscaled vertical space between lines.
const LINE_GAP: u32 = 2;

/// Drawn for characters the bitmap font does not cover.
const REPLACEMENT: char = '?';

// ─────────────────────────────────────────────────────────────────────────────
// Layout
// ─────────────────────────────────────────────────────────────────────────────

/// Resolved colors and metrics for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterStyle {
    pub scale: u32,
    pub padding: u32,
    pub tab_width: u32,
    pub line_numbers: bool,
    pub background: Rgba<u8>,
    pub gutter_background: Rgba<u8>,
    pub gutter_foreground: Rgba<u8>,
}

impl RasterStyle {
    fn cell_width(&self) -> u32 {
        GLYPH_SIZE * self.scale
    }

    fn line_height(&self) -> u32 {
        (GLYPH_SIZE + LINE_GAP) * self.scale
    }
}

/// One drawable character with its color.
struct Cell {
    ch: char,
    color: Rgba<u8>,
    bold: bool,
}

/// Expand a highlighted line into fixed-width cells, resolving tabs.
fn layout_line(line: &HighlightedLine, tab_width: u32) -> Vec<Cell> {
    let tab_width = tab_width.max(1) as usize;
    let mut cells = Vec::new();

    for segment in &line.segments {
        for ch in segment.text.chars() {
            match ch {
                '\n' | '\r' => {}
                '\t' => {
                    let pad = tab_width - cells.len() % tab_width;
                    cells.extend((0..pad).map(|_| Cell {
                        ch: ' ',
                        color: segment.foreground,
                        bold: false,
                    }));
                }
                ch => cells.push(Cell {
                    ch,
                    color: segment.foreground,
                    bold: segment.bold,
                }),
            }
        }
    }

    cells
}

// ─────────────────────────────────────────────────────────────────────────────
// Drawing
// ─────────────────────────────────────────────────────────────────────────────

/// Render highlighted lines into an image.
///
/// An empty snippet still produces a one-line canvas.
pub fn rasterize(lines: &[HighlightedLine], style: &RasterStyle) -> RgbaImage {
    let rows: Vec<Vec<Cell>> = lines
        .iter()
        .map(|line| layout_line(line, style.tab_width))
        .collect();

    let cell_w = style.cell_width();
    let line_h = style.line_height();
    let row_count = rows.len().max(1) as u32;
    let max_cols = rows.iter().map(Vec::len).max().unwrap_or(0).max(1) as u32;

    let digits = row_count.to_string().len() as u32;
    let gutter_width = if style.line_numbers {
        (digits + 1) * cell_w + style.padding
    } else {
        0
    };

    let width = gutter_width + style.padding * 2 + max_cols * cell_w;
    let height = style.padding * 2 + row_count * line_h;
    let mut img = RgbaImage::from_pixel(width, height, style.background);

    if style.line_numbers {
        for y in 0..height {
            for x in 0..gutter_width {
                img.put_pixel(x, y, style.gutter_background);
            }
        }
    }

    let glyph_top_offset = LINE_GAP / 2 * style.scale;
    for (row, cells) in rows.iter().enumerate() {
        let top = style.padding + row as u32 * line_h + glyph_top_offset;

        if style.line_numbers {
            let number = format!("{:>width$}", row + 1, width = digits as usize);
            for (col, ch) in number.chars().enumerate() {
                let left = style.padding / 2 + col as u32 * cell_w;
                draw_glyph(&mut img, ch, left, top, style.scale, style.gutter_foreground, true);
            }
        }

        for (col, cell) in cells.iter().enumerate() {
            let left = gutter_width + style.padding + col as u32 * cell_w;
            draw_glyph(&mut img, cell.ch, left, top, style.scale, cell.color, cell.bold);
        }
    }

    img
}

/// Bitmap rows for a character; bit 0 of each row is the leftmost pixel.
fn glyph_for(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| GREEK_FONTS.get(ch))
        .or_else(|| BOX_FONTS.get(ch))
        .or_else(|| BLOCK_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get(REPLACEMENT))
        .unwrap_or([0; 8])
}

fn draw_glyph(
    img: &mut RgbaImage,
    ch: char,
    left: u32,
    top: u32,
    scale: u32,
    color: Rgba<u8>,
    bold: bool,
) {
    if ch == ' ' {
        return;
    }

    let glyph = glyph_for(ch);
    for (gy, bits) in glyph.iter().enumerate() {
        for gx in 0..GLYPH_SIZE {
            if bits & (1 << gx) == 0 {
                continue;
            }
            let x0 = left + gx * scale;
            let y0 = top + gy as u32 * scale;
            // Bold glyphs are smeared one source pixel to the right.
            let extra = if bold { scale } else { 0 };
            for y in y0..y0 + scale {
                for x in x0..x0 + scale + extra {
                    if x < img.width() && y < img.height() {
                        img.put_pixel(x, y, color);
                    }
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Encoding
// ─────────────────────────────────────────────────────────────────────────────

/// PNG-encode an RGBA image.
pub fn encode_png(img: &RgbaImage) -> ImageResult<Vec<u8>> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        img.as_raw(),
        img.width(),
        img.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(bytes)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
