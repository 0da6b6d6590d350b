/*
 *  lcd/frame.rs
 *
 *  KeyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
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

use crate::lcd::framebuffer::PixelBuffer;

/// One step of a screen's animation
#[derive(Debug, Clone)]
pub struct AnimationFrame {
    pub buffer: PixelBuffer,
    /// Scheduler ticks spent on this frame before the animation moves on
    pub display_count: u16,
}

impl AnimationFrame {
    pub fn new(buffer: PixelBuffer, display_count: u16) -> Self {
        Self { buffer, display_count }
    }
}
