/*
 *  lcd/framebuffer.rs
 *
 *  KeyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Bit-packed pixel buffer shared by frames, atlases and the PBM codec
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

use core::convert::Infallible;
use std::io::{self, Write};

use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

use crate::constants::{LCD_HEIGHT, LCD_WIDTH};
use crate::lcd::error::{LcdError, LcdResult};

/// A runtime-sized 1bpp buffer.
///
/// Pixels are packed 8 to a byte along a row, most significant bit first,
/// rows are stored top to bottom. A set bit is a lit pixel. The width is
/// always a multiple of 8 so every row starts on a byte boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Vec<u8>,
    w: u16,
    h: u16,
}

impl PixelBuffer {
    /// Allocate a cleared buffer, reporting allocation failure instead of aborting
    pub fn try_new(width: u16, height: u16) -> LcdResult<Self> {
        let len = Self::packed_len(width, height)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)?;
        data.resize(len, 0);
        Ok(Self { data, w: width, h: height })
    }

    /// A cleared 160x48 content frame
    pub fn blank_frame() -> Self {
        Self {
            data: vec![0; LCD_WIDTH as usize / 8 * LCD_HEIGHT as usize],
            w: LCD_WIDTH,
            h: LCD_HEIGHT,
        }
    }

    /// Wrap already packed bytes, checking the length against the geometry
    pub fn from_bytes(width: u16, height: u16, data: Vec<u8>) -> LcdResult<Self> {
        let expected = Self::packed_len(width, height)?;
        if data.len() != expected {
            return Err(LcdError::Bounds(format!(
                "{}x{} buffer needs {} bytes, got {}",
                width, height, expected, data.len()
            )));
        }
        Ok(Self { data, w: width, h: height })
    }

    fn packed_len(width: u16, height: u16) -> LcdResult<usize> {
        if width % 8 != 0 {
            return Err(LcdError::Format(format!("width {} is not a multiple of 8", width)));
        }
        Ok(width as usize / 8 * height as usize)
    }

    pub fn width(&self) -> u16 { self.w }
    pub fn height(&self) -> u16 { self.h }

    /// Bytes per row
    pub fn stride(&self) -> usize { self.w as usize / 8 }

    pub fn as_slice(&self) -> &[u8] { &self.data }
    pub fn as_mut_slice(&mut self) -> &mut [u8] { &mut self.data }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Map a pixel to its byte index; None if out of bounds
    #[inline]
    pub fn byte_index(&self, x: u16, y: u16) -> Option<usize> {
        if x < self.w && y < self.h {
            Some(y as usize * self.stride() + x as usize / 8)
        } else {
            None
        }
    }

    pub fn get_pixel(&self, x: u16, y: u16) -> bool {
        self.byte_index(x, y)
            .map(|i| self.data[i] & (0x80 >> (x % 8)) != 0)
            .unwrap_or(false)
    }

    pub fn set_pixel(&mut self, x: u16, y: u16, on: bool) {
        if let Some(i) = self.byte_index(x, y) {
            let bit = 0x80 >> (x % 8);
            if on {
                self.data[i] |= bit;
            } else {
                self.data[i] &= !bit;
            }
        }
    }

    pub fn count_on_pixels(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Serialize as binary PBM (P4), the same layout the loader accepts
    pub fn write_pbm<W: Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "P4\n{} {}\n", self.w, self.h)?;
        out.write_all(&self.data)?;
        out.flush()
    }
}

impl OriginDimensions for PixelBuffer {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl DrawTarget for PixelBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if p.x >= 0 && p.y >= 0 && p.x <= u16::MAX as i32 && p.y <= u16::MAX as i32 {
                self.set_pixel(p.x as u16, p.y as u16, c.is_on());
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.data.fill(if color.is_on() { 0xff } else { 0x00 });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};

    #[test]
    fn test_blank_frame_geometry() {
        let fb = PixelBuffer::blank_frame();
        assert_eq!(fb.as_slice().len(), 960);
        assert_eq!(fb.stride(), 20);
        assert_eq!(fb.count_on_pixels(), 0);
    }

    #[test]
    fn test_width_must_be_byte_aligned() {
        assert!(matches!(PixelBuffer::try_new(12, 8), Err(LcdError::Format(_))));
        assert!(PixelBuffer::try_new(16, 8).is_ok());
    }

    #[test]
    fn test_from_bytes_length_check() {
        assert!(PixelBuffer::from_bytes(16, 2, vec![0; 4]).is_ok());
        assert!(matches!(PixelBuffer::from_bytes(16, 2, vec![0; 5]), Err(LcdError::Bounds(_))));
    }

    #[test]
    fn test_pixel_bit_order() {
        let mut fb = PixelBuffer::try_new(16, 2).unwrap();
        fb.set_pixel(0, 0, true);
        fb.set_pixel(9, 1, true);
        assert_eq!(fb.as_slice(), &[0x80, 0x00, 0x00, 0x40]);
        assert!(fb.get_pixel(9, 1));
        fb.set_pixel(9, 1, false);
        assert!(!fb.get_pixel(9, 1));
        // out of range reads are dark, writes are dropped
        assert!(!fb.get_pixel(16, 0));
        fb.set_pixel(16, 0, true);
        assert_eq!(fb.count_on_pixels(), 1);
    }

    #[test]
    fn test_draw_target() {
        let mut fb = PixelBuffer::blank_frame();
        Line::new(Point::new(0, 0), Point::new(9, 0))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut fb)
            .unwrap();
        assert_eq!(fb.as_slice()[0], 0xff);
        assert_eq!(fb.as_slice()[1], 0xc0);

        Rectangle::new(Point::new(-4, -4), Size::new(200, 100))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut fb)
            .unwrap();
        assert_eq!(fb.count_on_pixels(), 160 * 48);
    }

    #[test]
    fn test_write_pbm_header() {
        let fb = PixelBuffer::try_new(8, 2).unwrap();
        let mut out = Vec::new();
        fb.write_pbm(&mut out).unwrap();
        assert_eq!(out, b"P4\n8 2\n\x00\x00");
    }
}
