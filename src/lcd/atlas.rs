/*
 *  lcd/atlas.rs
 *
 *  KeyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Glyph atlas - one font sprite sheet plus its character table
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::collections::HashMap;
use std::path::Path;

use log::debug;

use crate::lcd::error::{LcdError, LcdResult};
use crate::lcd::framebuffer::PixelBuffer;
use crate::lcd::pbm::load_pbm;

/// Default sheet layout, one string per cell row
pub const DEFAULT_CHAR_ROWS: [&str; 6] = [
    "ABCDEFGHIJKLMNOP",
    "QRSTUVWXYZabcdef",
    "ghijklmnopqrstuv",
    "wxyz0123456789.:",
    ",;!?'\"-+*/=%()[]",
    "<>_#&@$|~^ °éèàç",
];

/// Visually wide characters that keep their full advance on condensed fonts
pub const WIDE_CHARS: [char; 6] = ['M', 'W', 'm', 'w', '@', '%'];

/// Character table of a sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharTable {
    /// [`DEFAULT_CHAR_ROWS`]
    Default,
    /// Display-specific layout, one string per cell row
    Custom(&'static [&'static str]),
}

impl CharTable {
    fn rows(&self) -> &'static [&'static str] {
        match self {
            CharTable::Default => &DEFAULT_CHAR_ROWS,
            CharTable::Custom(rows) => rows,
        }
    }
}

/// Everything needed to build an atlas from a sprite sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontSpec {
    /// File name inside the data directory
    pub file: &'static str,
    pub sheet_width: u16,
    pub sheet_height: u16,
    pub cell_width: u16,
    pub cell_height: u16,
    /// Blank columns on the left of every cell, removed from the advance
    pub font_left_shift: u16,
    /// Further tightening for condensed fonts, skipped for [`WIDE_CHARS`]
    pub extra_left_shift: u16,
    pub table: CharTable,
}

/// An in-memory sprite sheet with a char -> cell lookup. Immutable once built.
#[derive(Debug, Clone)]
pub struct GlyphAtlas {
    sheet: PixelBuffer,
    cell_width: u16,
    cell_height: u16,
    cell_byte_width: u16,
    font_left_shift: u16,
    extra_left_shift: u16,
    cells: HashMap<char, (u16, u16)>,
}

impl GlyphAtlas {
    /// Load the font's sheet from `dir` and build the atlas
    pub fn load(dir: &Path, spec: &FontSpec) -> LcdResult<Self> {
        let sheet = load_pbm(&dir.join(spec.file), spec.sheet_width, spec.sheet_height)?;
        Self::from_buffer(sheet, spec)
    }

    /// Build from an already decoded sheet
    pub fn from_buffer(sheet: PixelBuffer, spec: &FontSpec) -> LcdResult<Self> {
        let (cw, ch) = (spec.cell_width, spec.cell_height);
        if !(cw == 5 || cw == 6 || (cw > 0 && cw % 8 == 0)) {
            return Err(LcdError::Format(format!("unsupported cell width {}", cw)));
        }
        if ch == 0 || spec.font_left_shift + spec.extra_left_shift >= cw {
            return Err(LcdError::Format(format!(
                "bad cell geometry {}x{} with shifts {}/{}",
                cw, ch, spec.font_left_shift, spec.extra_left_shift
            )));
        }
        if sheet.width() != spec.sheet_width || sheet.height() != spec.sheet_height {
            return Err(LcdError::Format(format!(
                "sheet is {}x{}, font expects {}x{}",
                sheet.width(), sheet.height(), spec.sheet_width, spec.sheet_height
            )));
        }

        let mut cells = HashMap::new();
        for (cy, row) in spec.table.rows().iter().enumerate() {
            for (cx, c) in row.chars().enumerate() {
                let (cx, cy) = (cx as u16, cy as u16);
                if (cx + 1) * cw > sheet.width() || (cy + 1) * ch > sheet.height() {
                    return Err(LcdError::Format(format!(
                        "cell ({}, {}) for {:?} lies outside the {}x{} sheet",
                        cx, cy, c, sheet.width(), sheet.height()
                    )));
                }
                cells.insert(c, (cx, cy));
            }
        }
        debug!("{}: {} glyphs of {}x{}", spec.file, cells.len(), cw, ch);

        Ok(Self {
            sheet,
            cell_width: cw,
            cell_height: ch,
            cell_byte_width: cw.div_ceil(8),
            font_left_shift: spec.font_left_shift,
            extra_left_shift: spec.extra_left_shift,
            cells,
        })
    }

    pub fn cell_width(&self) -> u16 { self.cell_width }
    pub fn cell_height(&self) -> u16 { self.cell_height }
    pub fn cell_byte_width(&self) -> u16 { self.cell_byte_width }

    pub fn cell(&self, c: char) -> Option<(u16, u16)> {
        self.cells.get(&c).copied()
    }

    pub fn has_char(&self, c: char) -> bool {
        self.cells.contains_key(&c)
    }

    #[inline]
    fn sheet_byte(&self, index: usize) -> u8 {
        self.sheet.as_slice().get(index).copied().unwrap_or(0)
    }

    /// One byte of glyph row `line`, left aligned (MSB is the leftmost pixel).
    ///
    /// Cells narrower than a byte straddle source bytes; the case tables below
    /// pick the bits for every possible start offset.
    pub fn glyph_row(&self, cell: (u16, u16), line: u16, cell_byte_offset: u16) -> u8 {
        let stride = self.sheet.stride();
        let (cx, cy) = (cell.0 as usize, cell.1 as usize);
        let index = cy * self.cell_height as usize * stride
            + (cx * self.cell_width as usize) / 8
            + line as usize * stride;

        match self.cell_width {
            6 => {
                let a = self.sheet_byte(index);
                match cx % 4 {
                    0 => a & 0b1111_1100,
                    1 => {
                        let b = self.sheet_byte(index + 1);
                        ((a & 0b0000_0011) << 6) | ((b & 0b1111_0000) >> 2)
                    }
                    2 => {
                        let b = self.sheet_byte(index + 1);
                        ((a & 0b0000_1111) << 4) | ((b & 0b1100_0000) >> 4)
                    }
                    _ => (a & 0b0011_1111) << 2,
                }
            }
            5 => {
                let a = self.sheet_byte(index);
                match cx % 8 {
                    0 => a & 0b1111_1000,
                    1 => {
                        let b = self.sheet_byte(index + 1);
                        ((a & 0b0000_0111) << 5) | ((b & 0b1100_0000) >> 3)
                    }
                    2 => (a & 0b0011_1110) << 2,
                    3 => {
                        let b = self.sheet_byte(index + 1);
                        ((a & 0b0000_0001) << 7) | ((b & 0b1111_0000) >> 1)
                    }
                    4 => {
                        let b = self.sheet_byte(index + 1);
                        ((a & 0b0000_1111) << 4) | ((b & 0b1000_0000) >> 4)
                    }
                    5 => (a & 0b0111_1100) << 1,
                    6 => {
                        let b = self.sheet_byte(index + 1);
                        ((a & 0b0000_0011) << 6) | ((b & 0b1110_0000) >> 2)
                    }
                    _ => (a & 0b0001_1111) << 3,
                }
            }
            _ => self.sheet_byte(index + cell_byte_offset as usize),
        }
    }

    /// Bits a cell occupies in its byte, left aligned
    #[inline]
    fn cell_mask(&self) -> u8 {
        if self.cell_width % 8 == 0 {
            0xff
        } else {
            0xffu8 << (8 - self.cell_width)
        }
    }

    /// Horizontal advance after drawing `c`
    pub fn advance(&self, c: char) -> u16 {
        let step = self.cell_width - self.font_left_shift;
        if self.extra_left_shift > 0 && !WIDE_CHARS.contains(&c) {
            step - self.extra_left_shift
        } else {
            step
        }
    }

    pub fn text_width(&self, text: &str) -> u16 {
        text.chars().map(|c| self.advance(c)).fold(0u16, |acc, a| acc.saturating_add(a))
    }

    /// X that centers `text` on a target `frame_width` wide
    pub fn centered_x(&self, text: &str, frame_width: u16) -> u16 {
        frame_width.saturating_sub(self.text_width(text)) / 2
    }

    /// Y that centers one line of text on a target `frame_height` tall
    pub fn centered_y(&self, frame_height: u16) -> u16 {
        frame_height.saturating_sub(self.cell_height) / 2
    }

    /// Draw `c` with its top-left corner at (x, y) and return the next x.
    ///
    /// Destination bits covered by the cell are cleared first, so a glyph
    /// replaces whatever was underneath it.
    pub fn blit_char(&self, target: &mut PixelBuffer, c: char, x: u16, y: u16) -> LcdResult<u16> {
        let cell = self.cell(c).ok_or(LcdError::UnknownCharacter(c))?;

        if target.width() < self.cell_width || x > target.width() - self.cell_width {
            return Err(LcdError::Bounds(format!(
                "x {} for {:?} exceeds {}", x, c, target.width().saturating_sub(self.cell_width)
            )));
        }
        if target.height() < self.cell_height || y > target.height() - self.cell_height {
            return Err(LcdError::Bounds(format!(
                "y {} for {:?} exceeds {}", y, c, target.height().saturating_sub(self.cell_height)
            )));
        }

        let stride = target.stride();
        let x_byte = x as usize / 8;
        let shift = x % 8;
        let mask = self.cell_mask();
        let buf = target.as_mut_slice();

        for line in 0..self.cell_height {
            let row = (y + line) as usize * stride;
            for b in 0..self.cell_byte_width {
                let glyph = self.glyph_row(cell, line, b);
                let col = x_byte + b as usize;
                let dst = row + col;
                if shift > 0 {
                    let spill = 8 - shift;
                    buf[dst] &= !(mask >> shift);
                    buf[dst] |= glyph >> shift;
                    if col + 1 < stride {
                        buf[dst + 1] &= !(mask << spill);
                        buf[dst + 1] |= glyph << spill;
                    }
                } else {
                    buf[dst] &= !mask;
                    buf[dst] |= glyph;
                }
            }
        }

        Ok(x + self.advance(c))
    }
}
