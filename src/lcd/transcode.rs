/*
 *  lcd/transcode.rs
 *
 *  KeyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Row-major frame to the LCD's column-band layout
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

use crate::constants::{LCD_BUFFER_LEN, LCD_HEADER_LEN, LCD_REPORT_ID};
use crate::lcd::error::{LcdError, LcdResult};
use crate::lcd::framebuffer::PixelBuffer;

/// Transpose `source` into `destination` starting at index 0.
///
/// The device wants 8-row bands, one byte per pixel column, bit n being
/// row n of the band. `destination` must be exactly as long as the frame.
pub fn transcode(destination: &mut [u8], source: &PixelBuffer) -> LcdResult<()> {
    let width = source.width() as usize;
    let stride = source.stride();
    let bands = source.height() as usize / 8;
    let src = source.as_slice();

    if source.height() % 8 != 0 || destination.len() != bands * width {
        return Err(LcdError::Bounds(format!(
            "cannot transcode {}x{} into {} bytes",
            source.width(), source.height(), destination.len()
        )));
    }

    for band in 0..bands {
        for col in 0..stride {
            for b in (0..8).rev() {
                let mut out = 0u8;
                for n in 0..8 {
                    let s = src[(band * 8 + n) * stride + col];
                    out |= ((s >> b) & 1) << n;
                }
                destination[band * width + col * 8 + (7 - b)] = out;
            }
        }
    }
    Ok(())
}

/// Fill a full device report: header, then the transcoded frame
pub fn write_device_frame(buffer: &mut [u8], frame: &PixelBuffer) -> LcdResult<()> {
    if buffer.len() != LCD_BUFFER_LEN {
        return Err(LcdError::Bounds(format!(
            "device buffer is {} bytes, expected {}", buffer.len(), LCD_BUFFER_LEN
        )));
    }
    transcode(&mut buffer[LCD_HEADER_LEN..], frame)?;
    write_header(buffer);
    Ok(())
}

/// Zero the header and stamp the report id
pub fn write_header(buffer: &mut [u8]) {
    let end = LCD_HEADER_LEN.min(buffer.len());
    buffer[..end].fill(0);
    if let Some(first) = buffer.first_mut() {
        *first = LCD_REPORT_ID;
    }
}
