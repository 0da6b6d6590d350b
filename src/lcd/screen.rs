/*
 *  lcd/screen.rs
 *
 *  KeyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Screen plugin trait and the state every screen shares
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

use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::constants::{LCD_HEIGHT, LCD_WIDTH};
use crate::glyphs::padlock_glyph;
use crate::lcd::draw;
use crate::lcd::error::{LcdError, LcdResult};
use crate::lcd::fonts::{FontCache, FontId};
use crate::lcd::frame::AnimationFrame;
use crate::lcd::framebuffer::PixelBuffer;
use crate::lcd::pbm::load_pbm;

/// Who a screen is, as advertised to collaborators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginIdentity {
    /// Single bit, so a u64 mask can enable up to 64 screens
    pub id: u64,
    pub name: String,
    pub description: String,
}

impl PluginIdentity {
    pub fn new(id: u64, name: impl Into<String>, description: impl Into<String>) -> Self {
        debug_assert!(id.is_power_of_two(), "plugin id {:#x} must be a single bit", id);
        Self {
            id,
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Refresh interval and how many ticks a screen stays up before rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tempo {
    pub interval_ms: u16,
    pub frames: u16,
}

impl Tempo {
    pub const DEFAULT: Tempo = Tempo::new(1000, 20);
    pub const RAPID: Tempo = Tempo::new(100, 30);

    pub const fn new(interval_ms: u16, frames: u16) -> Self {
        Self { interval_ms, frames }
    }
}

/// What a screen gets from its surroundings at init time
#[derive(Debug, Clone)]
pub struct ScreenContext {
    pub data_dir: PathBuf,
    pub product_name: String,
}

impl ScreenContext {
    pub fn new(data_dir: impl Into<PathBuf>, product_name: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            product_name: product_name.into(),
        }
    }
}

/// Frames, animation position and lock bookkeeping of one screen
#[derive(Debug)]
pub struct ScreenCore {
    identity: PluginIdentity,
    tempo: Tempo,
    frames: Vec<AnimationFrame>,
    frame_index: usize,
    frame_ticks: u16,
    ever_locked: bool,
    initialized: bool,
}

impl ScreenCore {
    pub fn new(identity: PluginIdentity, tempo: Tempo) -> Self {
        Self {
            identity,
            tempo,
            frames: Vec::new(),
            frame_index: 0,
            frame_ticks: 0,
            ever_locked: false,
            initialized: false,
        }
    }

    pub fn identity(&self) -> &PluginIdentity { &self.identity }
    pub fn tempo(&self) -> Tempo { self.tempo }
    pub fn is_initialized(&self) -> bool { self.initialized }
    pub fn frame_count(&self) -> usize { self.frames.len() }
    pub fn frame_index(&self) -> usize { self.frame_index }
    pub fn ever_locked(&self) -> bool { self.ever_locked }

    /// Seal the frame list after a screen's init; a screen without frames is unusable
    pub fn finish_init(&mut self) -> LcdResult<()> {
        if self.frames.is_empty() {
            return Err(LcdError::Inconsistent(format!("{} built no frames", self.identity.name)));
        }
        self.reset_animation();
        self.initialized = true;
        Ok(())
    }

    pub fn add_frame(&mut self, buffer: PixelBuffer, display_count: u16) -> LcdResult<()> {
        if buffer.width() != LCD_WIDTH || buffer.height() != LCD_HEIGHT {
            return Err(LcdError::Format(format!(
                "frame is {}x{}, the LCD is {}x{}",
                buffer.width(), buffer.height(), LCD_WIDTH, LCD_HEIGHT
            )));
        }
        self.frames.try_reserve(1)?;
        self.frames.push(AnimationFrame::new(buffer, display_count));
        Ok(())
    }

    pub fn add_blank_frame(&mut self, display_count: u16) -> LcdResult<()> {
        let buffer = PixelBuffer::try_new(LCD_WIDTH, LCD_HEIGHT)?;
        self.add_frame(buffer, display_count)
    }

    pub fn add_frame_from_file(&mut self, path: &Path, display_count: u16) -> LcdResult<()> {
        let buffer = load_pbm(path, LCD_WIDTH, LCD_HEIGHT)?;
        self.add_frame(buffer, display_count)
    }

    /// Step the animation: move on once the current frame's display count is reached
    pub fn advance_frame(&mut self) -> LcdResult<()> {
        let len = self.frames.len();
        let Some(frame) = self.frames.get(self.frame_index) else {
            return Err(LcdError::Inconsistent(format!(
                "{} has frame index {} of {}", self.identity.name, self.frame_index, len
            )));
        };

        if self.frame_ticks >= frame.display_count {
            self.frame_index = (self.frame_index + 1) % len;
            self.frame_ticks = 0;
        } else {
            self.frame_ticks += 1;
        }
        Ok(())
    }

    pub fn reset_animation(&mut self) {
        self.frame_index = 0;
        self.frame_ticks = 0;
    }

    pub fn reset_ever_locked(&mut self) {
        self.ever_locked = false;
    }

    pub fn mark_locked(&mut self) {
        self.ever_locked = true;
    }

    pub fn current_frame(&self) -> LcdResult<&PixelBuffer> {
        self.frames
            .get(self.frame_index)
            .map(|f| &f.buffer)
            .ok_or_else(|| LcdError::Inconsistent(format!("{} has no current frame", self.identity.name)))
    }

    pub fn current_frame_mut(&mut self) -> LcdResult<&mut PixelBuffer> {
        let name = &self.identity.name;
        self.frames
            .get_mut(self.frame_index)
            .map(|f| &mut f.buffer)
            .ok_or_else(|| LcdError::Inconsistent(format!("{} has no current frame", name)))
    }

    pub fn last_frame_mut(&mut self) -> LcdResult<&mut PixelBuffer> {
        let name = &self.identity.name;
        self.frames
            .last_mut()
            .map(|f| &mut f.buffer)
            .ok_or_else(|| LcdError::Inconsistent(format!("{} has no frames", name)))
    }

    pub fn clear_current_frame(&mut self) {
        if let Ok(frame) = self.current_frame_mut() {
            frame.clear();
        }
    }

    // The draw helpers below never fail: a bad call is logged and skipped,
    // whatever was drawn before stays.

    pub fn draw_progress_bar(&mut self, percent: u8, x: u16, y: u16) {
        let result = self.current_frame_mut().and_then(|f| draw::draw_progress_bar(f, percent, x, y));
        if let Err(e) = result {
            warn!("{}: progress bar skipped: {}", self.identity.name, e);
        }
    }

    /// Padlock overlay: locked, unlocked after a lock, or blank if never locked
    pub fn draw_padlock(&mut self, locked: bool, x: u16, y: u16) {
        if locked {
            self.ever_locked = true;
        }
        let glyph = padlock_glyph(locked, self.ever_locked);
        let result = self.current_frame_mut().and_then(|f| draw::draw_padlock(f, glyph, x, y));
        if let Err(e) = result {
            warn!("{}: padlock skipped: {}", self.identity.name, e);
        }
    }

    pub fn draw_vertical_line(&mut self, x: u16, y: u16, size: u16) {
        let result = self.current_frame_mut().and_then(|f| draw::draw_vertical_line(f, x, y, size));
        if let Err(e) = result {
            warn!("{}: vertical line skipped: {}", self.identity.name, e);
        }
    }

    /// Write on the current frame; negative x or y centers the text
    pub fn write_string(&mut self, fonts: &mut FontCache, font: FontId, text: &str, x: i32, y: i32) {
        let result = fonts.atlas(font).and_then(|atlas| {
            let frame = self.current_frame_mut()?;
            draw::draw_text(frame, atlas, text, x, y)
        });
        self.log_text_failure(result, text);
    }

    /// Same as [`write_string`](Self::write_string) on the last frame, used while building frames
    pub fn write_string_on_last_frame(&mut self, fonts: &mut FontCache, font: FontId, text: &str, x: i32, y: i32) {
        let result = fonts.atlas(font).and_then(|atlas| {
            let frame = self.last_frame_mut()?;
            draw::draw_text(frame, atlas, text, x, y)
        });
        self.log_text_failure(result, text);
    }

    fn log_text_failure(&self, result: LcdResult<()>, text: &str) {
        match result {
            Ok(()) => debug!("{}: wrote {:?}", self.identity.name, text),
            Err(e) => warn!("{}: text {:?} cut short: {}", self.identity.name, text, e),
        }
    }
}

/// A selectable LCD display mode.
///
/// The set is closed (splash, system monitor, end screen); each kind owns a
/// [`ScreenCore`] and fills its frames in `init`.
pub trait Screen {
    fn core(&self) -> &ScreenCore;

    fn core_mut(&mut self) -> &mut ScreenCore;

    /// Build the frames. An error here gets the screen discarded.
    fn init(&mut self, fonts: &mut FontCache, ctx: &ScreenContext) -> LcdResult<()>;

    /// Redraw dynamic content on the current frame, once per tick
    fn refresh(&mut self, _fonts: &mut FontCache) -> LcdResult<()> {
        Ok(())
    }

    fn identity(&self) -> &PluginIdentity {
        self.core().identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{PADLOCK_X, PADLOCK_Y};
    use crate::glyphs::{GLYPH_PADLOCK_LOCKED, GLYPH_PADLOCK_UNLOCKED};
    use crate::lcd::atlas::tests::test_atlas;

    fn core_with_frames(counts: &[u16]) -> ScreenCore {
        let mut core = ScreenCore::new(PluginIdentity::new(1 << 4, "test", "test screen"), Tempo::DEFAULT);
        for &c in counts {
            core.add_blank_frame(c).unwrap();
        }
        core.finish_init().unwrap();
        core
    }

    fn padlock_rows(core: &ScreenCore) -> Vec<u8> {
        let buf = core.current_frame().unwrap().as_slice();
        (0..6).map(|l| buf[(PADLOCK_Y as usize + l) * 20 + PADLOCK_X as usize / 8]).collect()
    }

    #[test]
    fn test_advance_frame_wraps() {
        let mut core = core_with_frames(&[1, 0]);
        assert_eq!(core.frame_index(), 0);
        core.advance_frame().unwrap(); // ticks 0 -> 1
        assert_eq!(core.frame_index(), 0);
        core.advance_frame().unwrap(); // count reached
        assert_eq!(core.frame_index(), 1);
        core.advance_frame().unwrap(); // zero count moves straight on, wrapping
        assert_eq!(core.frame_index(), 0);
    }

    #[test]
    fn test_empty_screen_is_inconsistent() {
        let mut core = ScreenCore::new(PluginIdentity::new(1, "empty", ""), Tempo::DEFAULT);
        assert!(matches!(core.advance_frame(), Err(LcdError::Inconsistent(_))));
        assert!(matches!(core.finish_init(), Err(LcdError::Inconsistent(_))));
        assert!(!core.is_initialized());
        // drawing on nothing is logged, not fatal
        core.draw_vertical_line(0, 0, 4);
    }

    #[test]
    fn test_frame_geometry_checked() {
        let mut core = ScreenCore::new(PluginIdentity::new(1, "odd", ""), Tempo::DEFAULT);
        let small = PixelBuffer::try_new(128, 64).unwrap();
        assert!(matches!(core.add_frame(small, 1), Err(LcdError::Format(_))));
    }

    #[test]
    fn test_padlock_states() {
        let mut core = core_with_frames(&[0]);
        core.draw_padlock(false, PADLOCK_X, PADLOCK_Y);
        assert_eq!(padlock_rows(&core), vec![0; 6]);

        core.draw_padlock(true, PADLOCK_X, PADLOCK_Y);
        assert!(core.ever_locked());
        assert_eq!(padlock_rows(&core), GLYPH_PADLOCK_LOCKED.to_vec());

        core.draw_padlock(false, PADLOCK_X, PADLOCK_Y);
        assert_eq!(padlock_rows(&core), GLYPH_PADLOCK_UNLOCKED.to_vec());

        core.reset_ever_locked();
        core.draw_padlock(false, PADLOCK_X, PADLOCK_Y);
        assert_eq!(padlock_rows(&core), vec![0; 6]);
    }

    #[test]
    fn test_write_string_targets() {
        let mut fonts = FontCache::new("/nonexistent");
        fonts.preload(FontId::Monospace88, test_atlas(8, 8));
        let mut core = core_with_frames(&[0, 0]);

        core.write_string_on_last_frame(&mut fonts, FontId::Monospace88, "Hi", 0, 0);
        assert_eq!(core.current_frame().unwrap().count_on_pixels(), 0);

        core.write_string(&mut fonts, FontId::Monospace88, "Hi", 0, 0);
        assert!(core.current_frame().unwrap().count_on_pixels() > 0);
    }

    #[test]
    fn test_write_string_swallows_failures() {
        let mut fonts = FontCache::new("/nonexistent");
        let mut core = core_with_frames(&[0]);
        // font file missing
        core.write_string(&mut fonts, FontId::Monospace85, "abc", 0, 0);
        assert_eq!(core.current_frame().unwrap().count_on_pixels(), 0);

        fonts.preload(FontId::Monospace88, test_atlas(8, 8));
        // runs off the right edge after a few glyphs
        core.write_string(&mut fonts, FontId::Monospace88, "AAAAAAAAAAAAAAAAAAAAAAAA", 100, 0);
        assert!(core.current_frame().unwrap().count_on_pixels() > 0);
    }

    #[test]
    fn test_progress_bar_skip_is_silent() {
        let mut core = core_with_frames(&[0]);
        core.draw_progress_bar(40, 100, 0);
        assert_eq!(core.current_frame().unwrap().count_on_pixels(), 0);
        core.draw_progress_bar(40, 8, 0);
        assert!(core.current_frame().unwrap().count_on_pixels() > 0);
    }
}
