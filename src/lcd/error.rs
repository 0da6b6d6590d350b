/*
 *  lcd/error.rs
 *
 *  KeyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Unified error types for the LCD subsystem
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

use thiserror::Error;

/// Unified error type for bitmap, font, frame and scheduler operations
#[derive(Debug, Error)]
pub enum LcdError {
    /// Bad magic token, malformed header or dimension mismatch
    #[error("Bitmap format error: {0}")]
    Format(String),

    /// Open/read failure on a bitmap file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bitmap payload ended before the announced size
    #[error("Short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    /// Bytes found after the bitmap payload
    #[error("Unexpected trailing data after bitmap payload")]
    TrailingData,

    /// Glyph, frame or buffer index outside the target
    #[error("Out of bounds: {0}")]
    Bounds(String),

    /// Character has no cell in the glyph atlas
    #[error("Unknown character {0:?}")]
    UnknownCharacter(char),

    /// Frame storage could not be reserved
    #[error("Allocation failed: {0}")]
    Allocation(String),

    /// A full rotation found no plugin enabled by the mask
    #[error("No loaded plugin enabled by mask {0:#018x}")]
    AllDisabled(u64),

    /// Internal state broken (e.g. a screen without frames)
    #[error("Inconsistent state: {0}")]
    Inconsistent(String),
}

impl LcdError {
    /// True for the IO family: open/read failures, short reads and trailing data
    pub fn is_io(&self) -> bool {
        matches!(self, LcdError::Io(_) | LcdError::ShortRead { .. } | LcdError::TrailingData)
    }
}

impl From<std::collections::TryReserveError> for LcdError {
    fn from(err: std::collections::TryReserveError) -> Self {
        LcdError::Allocation(err.to_string())
    }
}

pub type LcdResult<T> = Result<T, LcdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_family() {
        assert!(LcdError::TrailingData.is_io());
        assert!(LcdError::ShortRead { expected: 960, actual: 959 }.is_io());
        assert!(LcdError::from(std::io::Error::other("gone")).is_io());
        assert!(!LcdError::Format("P1".into()).is_io());
        assert!(!LcdError::UnknownCharacter('¤').is_io());
    }

    #[test]
    fn test_messages() {
        let err = LcdError::ShortRead { expected: 960, actual: 12 };
        assert_eq!(err.to_string(), "Short read: expected 960 bytes, got 12");
        let err = LcdError::AllDisabled(0);
        assert_eq!(err.to_string(), "No loaded plugin enabled by mask 0x0000000000000000");
    }
}
