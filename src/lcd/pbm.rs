/*
 *  lcd/pbm.rs
 *
 *  KeyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Strict binary PBM (P4) loader for sprite sheets and splash images
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

use std::fs::File;
use std::io::{self, BufRead, BufReader, ErrorKind, Read};
use std::path::Path;

use log::debug;

use crate::lcd::error::{LcdError, LcdResult};
use crate::lcd::framebuffer::PixelBuffer;

/// Magic token of the raw (binary) portable bitmap format
pub const PBM_MAGIC: &str = "P4";

// header tokens are short, anything longer is garbage
const MAX_TOKEN_LEN: usize = 8;

/// Load a P4 bitmap whose geometry must match the caller's expectation.
///
/// The header is the magic token, then width and height, with any number of
/// `#` comment lines in between. Exactly `(width/8)*height` payload bytes
/// must follow a single whitespace byte, and nothing may follow the payload.
pub fn load_pbm(path: &Path, expected_width: u16, expected_height: u16) -> LcdResult<PixelBuffer> {
    debug!("loading bitmap {}", path.display());
    let file = File::open(path)?;
    parse_pbm(BufReader::new(file), expected_width, expected_height)
}

/// Same as [`load_pbm`] over any buffered reader
pub fn parse_pbm<R: BufRead>(mut reader: R, expected_width: u16, expected_height: u16) -> LcdResult<PixelBuffer> {
    let magic = read_token(&mut reader)?;
    if magic != PBM_MAGIC {
        return Err(LcdError::Format(format!("bad magic {:?}, expected {}", magic, PBM_MAGIC)));
    }

    let width = read_dimension(&mut reader, "width")?;
    let height = read_dimension(&mut reader, "height")?;

    if width != expected_width || height != expected_height {
        return Err(LcdError::Format(format!(
            "dimensions {}x{} do not match expected {}x{}",
            width, height, expected_width, expected_height
        )));
    }
    if width % 8 != 0 {
        return Err(LcdError::Format(format!("width {} is not a multiple of 8", width)));
    }

    let expected = width as usize / 8 * height as usize;

    // a single whitespace byte separates the header from the payload
    match peek(&mut reader)? {
        Some(b) if b.is_ascii_whitespace() => reader.consume(1),
        Some(_) => return Err(LcdError::Format("missing separator after height".into())),
        None => return Err(LcdError::ShortRead { expected, actual: 0 }),
    }

    let mut data = Vec::new();
    data.try_reserve_exact(expected)?;
    data.resize(expected, 0);

    let mut filled = 0;
    while filled < expected {
        let n = reader.read(&mut data[filled..])?;
        if n == 0 {
            return Err(LcdError::ShortRead { expected, actual: filled });
        }
        filled += n;
    }

    let mut extra = [0u8; 1];
    if reader.read(&mut extra)? != 0 {
        return Err(LcdError::TrailingData);
    }

    PixelBuffer::from_bytes(width, height, data)
}

fn peek<R: BufRead>(reader: &mut R) -> LcdResult<Option<u8>> {
    Ok(reader.fill_buf()?.first().copied())
}

fn skip_comment<R: BufRead>(reader: &mut R) -> LcdResult<()> {
    let mut line = Vec::new();
    reader.read_until(b'\n', &mut line)?;
    Ok(())
}

fn read_token<R: BufRead>(reader: &mut R) -> LcdResult<String> {
    loop {
        match peek(reader)? {
            None => {
                return Err(LcdError::Io(io::Error::new(
                    ErrorKind::UnexpectedEof,
                    "bitmap ends inside its header",
                )))
            }
            Some(b'#') => skip_comment(reader)?,
            Some(b) if b.is_ascii_whitespace() => reader.consume(1),
            Some(_) => break,
        }
    }

    let mut token = String::new();
    while let Some(b) = peek(reader)? {
        if b.is_ascii_whitespace() || b == b'#' {
            break;
        }
        if token.len() >= MAX_TOKEN_LEN || !b.is_ascii_graphic() {
            return Err(LcdError::Format("malformed header token".into()));
        }
        token.push(b as char);
        reader.consume(1);
    }
    Ok(token)
}

fn read_dimension<R: BufRead>(reader: &mut R, what: &str) -> LcdResult<u16> {
    let token = read_token(reader)?;
    token
        .parse::<u16>()
        .map_err(|_| LcdError::Format(format!("bad {} token {:?}", what, token)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn pbm_bytes(header: &str, payload: &[u8]) -> Vec<u8> {
        let mut v = header.as_bytes().to_vec();
        v.extend_from_slice(payload);
        v
    }

    #[test]
    fn test_parse_exact() {
        let payload: Vec<u8> = (0..6).collect();
        let raw = pbm_bytes("P4\n16 3\n", &payload);
        let pb = parse_pbm(Cursor::new(raw), 16, 3).unwrap();
        assert_eq!(pb.as_slice(), payload.as_slice());
        assert_eq!((pb.width(), pb.height()), (16, 3));
    }

    #[test]
    fn test_comments_between_tokens() {
        let raw = pbm_bytes("P4\n# made by hand\n# twice\n8 # width\n2\n", &[0xaa, 0x55]);
        let pb = parse_pbm(Cursor::new(raw), 8, 2).unwrap();
        assert_eq!(pb.as_slice(), &[0xaa, 0x55]);
    }

    #[test]
    fn test_bad_magic() {
        let raw = pbm_bytes("P1\n8 1\n", &[0]);
        assert!(matches!(parse_pbm(Cursor::new(raw), 8, 1), Err(LcdError::Format(_))));
    }

    #[test]
    fn test_dimension_mismatch() {
        let raw = pbm_bytes("P4\n8 2\n", &[0, 0]);
        assert!(matches!(parse_pbm(Cursor::new(raw), 8, 3), Err(LcdError::Format(_))));
        let raw = pbm_bytes("P4\nx 2\n", &[0, 0]);
        assert!(matches!(parse_pbm(Cursor::new(raw), 8, 2), Err(LcdError::Format(_))));
    }

    #[test]
    fn test_short_payload() {
        let raw = pbm_bytes("P4\n8 4\n", &[1, 2, 3]);
        match parse_pbm(Cursor::new(raw), 8, 4) {
            Err(LcdError::ShortRead { expected, actual }) => {
                assert_eq!(expected, 4);
                assert_eq!(actual, 3);
            }
            other => panic!("expected short read, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_header_is_io() {
        // ends right after the height, no separator and no payload
        let err = parse_pbm(Cursor::new(b"P4\n8 2".to_vec()), 8, 2).unwrap_err();
        assert!(err.is_io());
        assert!(matches!(err, LcdError::ShortRead { expected: 2, actual: 0 }));

        for raw in [&b"P4\n8"[..], &b"P4\n8 "[..], &b"P4"[..], &b""[..], &b"P4\n# only a comment"[..]] {
            let err = parse_pbm(Cursor::new(raw.to_vec()), 8, 2).unwrap_err();
            assert!(err.is_io(), "{:?} gave {:?}", raw, err);
            assert!(matches!(err, LcdError::Io(ref e) if e.kind() == ErrorKind::UnexpectedEof));
        }

        // a non-blank byte after the height is still a malformed header
        let raw = pbm_bytes("P4\n8 2", &[0xff]);
        let err = parse_pbm(Cursor::new(raw), 8, 2).unwrap_err();
        assert!(matches!(err, LcdError::Format(_)));
    }

    #[test]
    fn test_trailing_byte() {
        let raw = pbm_bytes("P4\n8 2\n", &[1, 2, 3]);
        let err = parse_pbm(Cursor::new(raw), 8, 2).unwrap_err();
        assert!(matches!(err, LcdError::TrailingData));
        assert!(err.is_io());
    }

    #[test]
    fn test_payload_may_start_with_whitespace_bytes() {
        // 0x0a and 0x20 are data here, only the first separator is header
        let raw = pbm_bytes("P4 8 2\n", &[0x0a, 0x20]);
        let pb = parse_pbm(Cursor::new(raw), 8, 2).unwrap();
        assert_eq!(pb.as_slice(), &[0x0a, 0x20]);
    }

    #[test]
    fn test_load_from_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.pbm");
        let mut src = PixelBuffer::blank_frame();
        src.set_pixel(3, 7, true);
        src.write_pbm(std::fs::File::create(&path).unwrap()).unwrap();

        let loaded = load_pbm(&path, 160, 48).unwrap();
        assert_eq!(loaded, src);
    }

    #[test]
    fn test_missing_file_is_io() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_pbm(&dir.path().join("nope.pbm"), 8, 8).unwrap_err();
        assert!(matches!(err, LcdError::Io(_)));
    }

    #[test]
    fn test_file_with_extra_byte() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.pbm");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(&pbm_bytes("P4\n8 1\n", &[0xff, 0x00])).unwrap();
        drop(f);
        assert!(matches!(load_pbm(&path, 8, 1), Err(LcdError::TrailingData)));
    }
}
