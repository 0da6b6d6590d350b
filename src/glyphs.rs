/*
 *  glyphs.rs
 *
 *  KeyMonS - worth the squeeze
 *	(c) 2020-26 Stuart Hunter
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */
use crate::constants::PADLOCK_ROWS;

/// Padlock overlay variants, one byte per row, MSB is the leftmost pixel
pub const GLYPH_PADLOCK_LOCKED: [u8; PADLOCK_ROWS] = [0x70, 0x88, 0x88, 0xf8, 0xd8, 0xf8,];
pub const GLYPH_PADLOCK_UNLOCKED: [u8; PADLOCK_ROWS] = [0x70, 0x88, 0x80, 0xf8, 0xd8, 0xf8,];
pub const GLYPH_PADLOCK_NONE: [u8; PADLOCK_ROWS] = [0x00, 0x00, 0x00, 0x00, 0x00, 0x00,];

/// Columns a padlock glyph occupies; the clear mask for its byte.
pub const GLYPH_PADLOCK_MASK: u8 = 0xf8;

/// Pick the padlock glyph for the current lock state and the sticky flag.
pub fn padlock_glyph(locked: bool, ever_locked: bool) -> &'static [u8; PADLOCK_ROWS] {
    if locked {
        &GLYPH_PADLOCK_LOCKED
    } else if ever_locked {
        &GLYPH_PADLOCK_UNLOCKED
    } else {
        &GLYPH_PADLOCK_NONE
    }
}
