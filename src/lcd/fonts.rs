/*
 *  lcd/fonts.rs
 *
 *  KeyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Font cache - lazily builds one glyph atlas per font id
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
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};

use log::{error, info};

use crate::lcd::atlas::{CharTable, FontSpec, GlyphAtlas};
use crate::lcd::error::LcdResult;

/// Sheet layout of the 16x16 bold font, digits and capitals only
pub const BOLD_CHAR_ROWS: [&str; 5] = [
    "0123456789",
    "ABCDEFGHIJ",
    "KLMNOPQRST",
    "UVWXYZ.:%-",
    " !?/+'",
];

/// The fonts shipped in the data directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontId {
    /// 5x8, the smallest readable font
    Monospace85,
    /// 6x8, condensed by one pixel
    Monospace86,
    /// 8x8 with one blank leading column
    Monospace88,
    /// 16x16 bold digits and capitals
    DejaVuSansBold1616,
}

impl FontId {
    pub const ALL: [FontId; 4] = [
        FontId::Monospace85,
        FontId::Monospace86,
        FontId::Monospace88,
        FontId::DejaVuSansBold1616,
    ];

    /// File, geometry and shifts of this font
    pub fn spec(self) -> FontSpec {
        match self {
            FontId::Monospace85 => FontSpec {
                file: "monospace85.pbm",
                sheet_width: 80,
                sheet_height: 48,
                cell_width: 5,
                cell_height: 8,
                font_left_shift: 0,
                extra_left_shift: 0,
                table: CharTable::Default,
            },
            FontId::Monospace86 => FontSpec {
                file: "monospace86.pbm",
                sheet_width: 96,
                sheet_height: 48,
                cell_width: 6,
                cell_height: 8,
                font_left_shift: 0,
                extra_left_shift: 1,
                table: CharTable::Default,
            },
            FontId::Monospace88 => FontSpec {
                file: "monospace88.pbm",
                sheet_width: 128,
                sheet_height: 48,
                cell_width: 8,
                cell_height: 8,
                font_left_shift: 1,
                extra_left_shift: 0,
                table: CharTable::Default,
            },
            FontId::DejaVuSansBold1616 => FontSpec {
                file: "dejavusansbold1616.pbm",
                sheet_width: 160,
                sheet_height: 80,
                cell_width: 16,
                cell_height: 16,
                font_left_shift: 2,
                extra_left_shift: 0,
                table: CharTable::Custom(&BOLD_CHAR_ROWS),
            },
        }
    }
}

/// Owns every atlas built so far; callers only ever borrow them
#[derive(Debug)]
pub struct FontCache {
    data_dir: PathBuf,
    atlases: HashMap<FontId, GlyphAtlas>,
}

impl FontCache {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            atlases: HashMap::new(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Atlas for `id`, built from its sheet on first use.
    ///
    /// A failed build is returned to the caller and not remembered, so the
    /// next call tries the file again.
    pub fn atlas(&mut self, id: FontId) -> LcdResult<&GlyphAtlas> {
        match self.atlases.entry(id) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(e) => {
                let atlas = GlyphAtlas::load(&self.data_dir, &id.spec()).map_err(|err| {
                    error!("font {:?} unusable: {}", id, err);
                    err
                })?;
                info!("font {:?} loaded from {}", id, id.spec().file);
                Ok(e.insert(atlas))
            }
        }
    }

    /// Install a ready atlas, replacing any cached one
    pub fn preload(&mut self, id: FontId, atlas: GlyphAtlas) {
        self.atlases.insert(id, atlas);
    }

    pub fn is_loaded(&self, id: FontId) -> bool {
        self.atlases.contains_key(&id)
    }
}
