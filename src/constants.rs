/*
 *  constants.rs
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

/// The width of the keyboard LCD in pixels.
pub const LCD_WIDTH: u16 = 160;
/// The height of a content frame in pixels (the panel shows 43, the protocol carries 48).
pub const LCD_HEIGHT: u16 = 48;
/// Bytes per frame row, 8 horizontal pixels per byte.
pub const LCD_WIDTH_BYTES: usize = LCD_WIDTH as usize / 8;
/// Size of one packed content frame.
pub const LCD_FRAME_LEN: usize = LCD_WIDTH_BYTES * LCD_HEIGHT as usize; // 960

/// Header in front of the transcoded frame in the device buffer.
pub const LCD_HEADER_LEN: usize = 32;
/// Full device buffer handed to the USB transport.
pub const LCD_BUFFER_LEN: usize = LCD_HEADER_LEN + LCD_FRAME_LEN; // 992
/// Report id the display expects at byte 0.
pub const LCD_REPORT_ID: u8 = 0x03;

/// LCD key that toggles the plugin lock.
pub const LOCK_KEY: &str = "L2";

/// Advertised tick interval when no plugin is loaded.
pub const DEFAULT_PLUGIN_TIMING_MS: u16 = 1000;

// Padlock overlay sits in the bottom right corner
pub const PADLOCK_X: u16 = 152;
pub const PADLOCK_Y: u16 = 42;
pub const PADLOCK_ROWS: usize = 6;

// Progress bar geometry
pub const PROGRESS_BAR_WIDTH: u16 = 102;
pub const PROGRESS_BAR_HEIGHT: u16 = 7;
pub const PROGRESS_BAR_BYTES: usize = 13;
/// Interior rows alternate between these two dither patterns.
pub const PROGRESS_BAR_DITHER: [u8; 2] = [0b1010_1010, 0b0101_0101];
/// Fixed left and right border bits of the interior rows.
pub const PROGRESS_BAR_LEFT_BORDER: u8 = 0b1000_0000;
pub const PROGRESS_BAR_RIGHT_BORDER: u8 = 0b0000_0100;

/// Splash bitmap file name inside the data directory.
pub const SPLASH_PBM: &str = "splash.pbm";
