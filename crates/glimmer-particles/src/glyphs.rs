//! Built-in 5x7 block font.
//!
//! Each lit cell of a glyph becomes a thin box, so the resulting mesh has
//! front, back and side faces the same way extruded outline text would.

use crate::sampler::TriangleMesh;
use crate::text::TextMeshSource;
use glimmer_core::{Result, Vec3};

const GLYPH_COLS: usize = 5;
const GLYPH_ROWS: usize = 7;
/// Horizontal advance in cells (glyph width plus one cell of spacing)
const ADVANCE_CELLS: f32 = 6.0;

/// Rows top to bottom; bit 4 is the leftmost column.
fn glyph(c: char) -> Option<[u8; GLYPH_ROWS]> {
    let rows = match c.to_ascii_uppercase() {
        'A' => [0x0e, 0x11, 0x11, 0x1f, 0x11, 0x11, 0x11],
        'B' => [0x1e, 0x11, 0x11, 0x1e, 0x11, 0x11, 0x1e],
        'C' => [0x0e, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0e],
        'D' => [0x1e, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1e],
        'E' => [0x1f, 0x10, 0x10, 0x1e, 0x10, 0x10, 0x1f],
        'F' => [0x1f, 0x10, 0x10, 0x1e, 0x10, 0x10, 0x10],
        'G' => [0x0e, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0f],
        'H' => [0x11, 0x11, 0x11, 0x1f, 0x11, 0x11, 0x11],
        'I' => [0x0e, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0e],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0c],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1f],
        'M' => [0x11, 0x1b, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0e, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0e],
        'P' => [0x1e, 0x11, 0x11, 0x1e, 0x10, 0x10, 0x10],
        'Q' => [0x0e, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0d],
        'R' => [0x1e, 0x11, 0x11, 0x1e, 0x14, 0x12, 0x11],
        'S' => [0x0f, 0x10, 0x10, 0x0e, 0x01, 0x01, 0x1e],
        'T' => [0x1f, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0e],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0a, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0a],
        'X' => [0x11, 0x11, 0x0a, 0x04, 0x0a, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x0a, 0x04, 0x04, 0x04, 0x04],
        'Z' => [0x1f, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1f],
        '0' => [0x0e, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0e],
        '1' => [0x04, 0x0c, 0x04, 0x04, 0x04, 0x04, 0x0e],
        '2' => [0x0e, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1f],
        '3' => [0x1f, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0e],
        '4' => [0x02, 0x06, 0x0a, 0x12, 0x1f, 0x02, 0x02],
        '5' => [0x1f, 0x10, 0x1e, 0x01, 0x01, 0x11, 0x0e],
        '6' => [0x06, 0x08, 0x10, 0x1e, 0x11, 0x11, 0x0e],
        '7' => [0x1f, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0e, 0x11, 0x11, 0x0e, 0x11, 0x11, 0x0e],
        '9' => [0x0e, 0x11, 0x11, 0x0f, 0x01, 0x02, 0x0c],
        '!' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04],
        _ => return None,
    };
    Some(rows)
}

/// Block-letter mesher. Unknown characters advance like a space.
#[derive(Debug, Clone, Copy)]
pub struct BlockFont {
    /// Extrusion depth along z
    pub depth: f32,
}

impl BlockFont {
    pub fn new(depth: f32) -> Self {
        Self { depth }
    }

    pub fn supports(c: char) -> bool {
        c == ' ' || glyph(c).is_some()
    }

    /// Width of `text` at `size` (cap height), before centering
    pub fn text_width(text: &str, size: f32) -> f32 {
        let cell = size / GLYPH_ROWS as f32;
        let chars = text.chars().count();
        if chars == 0 {
            return 0.0;
        }
        // The trailing spacing column is not part of the visible width
        (chars as f32 * ADVANCE_CELLS - 1.0) * cell
    }
}

impl Default for BlockFont {
    fn default() -> Self {
        Self::new(0.05)
    }
}

impl TextMeshSource for BlockFont {
    fn mesh_for(&self, text: &str, size: f32) -> Result<TriangleMesh> {
        let cell = size / GLYPH_ROWS as f32;
        let mut mesh = TriangleMesh::new();

        for (i, c) in text.chars().enumerate() {
            let Some(rows) = glyph(c) else {
                if c != ' ' {
                    log::debug!("No block glyph for {c:?}, leaving a gap");
                }
                continue;
            };
            let origin_x = i as f32 * ADVANCE_CELLS * cell;
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_COLS {
                    if bits & (0x10 >> col) == 0 {
                        continue;
                    }
                    let x = origin_x + col as f32 * cell;
                    let y = (GLYPH_ROWS - 1 - row) as f32 * cell;
                    mesh.push_box(
                        Vec3::new(x, y, 0.0),
                        Vec3::new(x + cell, y + cell, self.depth),
                    );
                }
            }
        }

        Ok(mesh)
    }
}
