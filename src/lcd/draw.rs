/*
 *  lcd/draw.rs
 *
 *  KeyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Byte-level drawing primitives on packed frames
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

use crate::constants::{
    PROGRESS_BAR_BYTES, PROGRESS_BAR_DITHER, PROGRESS_BAR_HEIGHT, PROGRESS_BAR_LEFT_BORDER,
    PROGRESS_BAR_RIGHT_BORDER, PROGRESS_BAR_WIDTH,
};
use crate::glyphs::GLYPH_PADLOCK_MASK;
use crate::lcd::atlas::GlyphAtlas;
use crate::lcd::error::{LcdError, LcdResult};
use crate::lcd::framebuffer::PixelBuffer;

/// 102x7 dithered progress bar, 13 bytes wide from byte column `x / 8`.
///
/// The interior fill covers pixels `0..=percent` of the bar; the first and
/// last interior columns are always lit as borders.
pub fn draw_progress_bar(target: &mut PixelBuffer, percent: u8, x: u16, y: u16) -> LcdResult<()> {
    if x as u32 + PROGRESS_BAR_WIDTH as u32 > target.width() as u32 {
        return Err(LcdError::Bounds(format!("progress bar at x {} overflows the frame", x)));
    }

    let stride = target.stride();
    let first = x as usize / 8;
    let last_row = y as usize + PROGRESS_BAR_HEIGHT as usize - 1;
    let last_index = last_row * stride + first + PROGRESS_BAR_BYTES - 1;
    if first + PROGRESS_BAR_BYTES > stride || last_index >= target.as_slice().len() {
        return Err(LcdError::Bounds(format!("progress bar at ({}, {}) outside the frame", x, y)));
    }

    let percent = percent.min(100) as usize;
    let full = percent / 8;
    let partial = 0xffu8 << (7 - percent % 8);
    let buf = target.as_mut_slice();

    for row in 0..PROGRESS_BAR_HEIGHT as usize {
        let base = (y as usize + row) * stride + first;
        let bar = &mut buf[base..base + PROGRESS_BAR_BYTES];

        if row == 0 || row == PROGRESS_BAR_HEIGHT as usize - 1 {
            bar[..PROGRESS_BAR_BYTES - 1].fill(0xff);
            bar[PROGRESS_BAR_BYTES - 1] = 0b1111_1100;
            continue;
        }

        let pattern = PROGRESS_BAR_DITHER[(row - 1) % 2];
        for (i, byte) in bar.iter_mut().enumerate() {
            *byte = if i < full {
                pattern
            } else if i == full {
                pattern & partial
            } else {
                0
            };
        }
        bar[0] |= PROGRESS_BAR_LEFT_BORDER;
        bar[PROGRESS_BAR_BYTES - 1] |= PROGRESS_BAR_RIGHT_BORDER;
    }
    Ok(())
}

/// Write a 6-row padlock glyph, clearing the cells it covers
pub fn draw_padlock(target: &mut PixelBuffer, rows: &[u8], x: u16, y: u16) -> LcdResult<()> {
    if x > target.width().saturating_sub(5) || y as usize + rows.len() > target.height() as usize {
        return Err(LcdError::Bounds(format!("padlock at ({}, {}) outside the frame", x, y)));
    }

    let stride = target.stride();
    let col = x as usize / 8;
    let shift = x % 8;
    let buf = target.as_mut_slice();

    for (line, &glyph) in rows.iter().enumerate() {
        let dst = (y as usize + line) * stride + col;
        buf[dst] &= !(GLYPH_PADLOCK_MASK >> shift);
        buf[dst] |= glyph >> shift;
        if shift > 0 && col + 1 < stride {
            buf[dst + 1] &= !(GLYPH_PADLOCK_MASK << (8 - shift));
            buf[dst + 1] |= glyph << (8 - shift);
        }
    }
    Ok(())
}

/// OR a one pixel wide column of `size` rows starting at (x, y)
pub fn draw_vertical_line(target: &mut PixelBuffer, x: u16, y: u16, size: u16) -> LcdResult<()> {
    if size == 0 {
        return Ok(());
    }
    let bottom = y as u32 + size as u32 - 1;
    if x >= target.width() || bottom >= target.height() as u32 {
        return Err(LcdError::Bounds(format!("line at x {} rows {}..={} outside the frame", x, y, bottom)));
    }

    let bit = 0x80u8 >> (x % 8);
    for row in y..y + size {
        if let Some(i) = target.byte_index(x, row) {
            target.as_mut_slice()[i] |= bit;
        }
    }
    Ok(())
}

/// Render `text` with `atlas`; a negative x or y centers on that axis.
///
/// Stops at the first character that cannot be drawn and reports why;
/// everything before it stays on the target.
pub fn draw_text(target: &mut PixelBuffer, atlas: &GlyphAtlas, text: &str, x: i32, y: i32) -> LcdResult<()> {
    let mut x = if x < 0 {
        atlas.centered_x(text, target.width())
    } else {
        u16::try_from(x).map_err(|_| LcdError::Bounds(format!("x {} out of range", x)))?
    };
    let y = if y < 0 {
        atlas.centered_y(target.height())
    } else {
        u16::try_from(y).map_err(|_| LcdError::Bounds(format!("y {} out of range", y)))?
    };

    for c in text.chars() {
        x = atlas.blit_char(target, c, x, y)?;
    }
    Ok(())
}
