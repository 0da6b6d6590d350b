/*
 *  lcd/scheduler.rs
 *
 *  KeyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Plugin scheduler - decides which screen is up and renders it once per tick
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

use log::{debug, error, info};

use crate::constants::{DEFAULT_PLUGIN_TIMING_MS, LCD_BUFFER_LEN, LOCK_KEY, PADLOCK_X, PADLOCK_Y};
use crate::lcd::error::{LcdError, LcdResult};
use crate::lcd::fonts::FontCache;
use crate::lcd::framebuffer::PixelBuffer;
use crate::lcd::screen::{Screen, ScreenContext};
use crate::lcd::screens::builtin_screens;
use crate::lcd::transcode::{write_device_frame, write_header};
use crate::sensors::SensorSource;

/// What collaborators see of a loaded screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginProperties {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub interval_ms: u16,
    pub frames: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    NoPlugins,
    Active { index: usize, locked: bool },
}

/// Rotating screen scheduler.
///
/// Owns the screens, the font cache they draw with and the device buffer
/// handed out after every tick. Nothing here ever fails outward: a tick that
/// goes wrong is logged and comes out blank.
pub struct PluginScheduler {
    screens: Vec<Box<dyn Screen>>,
    current: usize,
    tick_counter: u16,
    locked: bool,
    fonts: FontCache,
    buffer: Vec<u8>,
}

impl PluginScheduler {
    /// Scheduler over the built-in screens
    pub fn new(fonts: FontCache, ctx: &ScreenContext, sensors: Box<dyn SensorSource>) -> Self {
        Self::with_screens(fonts, ctx, builtin_screens(sensors))
    }

    /// Initialise `screens` in order, keeping only those that come up
    pub fn with_screens(mut fonts: FontCache, ctx: &ScreenContext, screens: Vec<Box<dyn Screen>>) -> Self {
        let mut loaded: Vec<Box<dyn Screen>> = Vec::with_capacity(screens.len());
        for mut screen in screens {
            let name = screen.identity().name.clone();
            let ready = screen
                .init(&mut fonts, ctx)
                .and_then(|_| screen.core_mut().finish_init());
            match ready {
                Ok(()) => {
                    info!("plugin {} ready, {} frame(s)", name, screen.core().frame_count());
                    loaded.push(screen);
                }
                Err(e) => error!("plugin {} discarded: {}", name, e),
            }
        }
        if loaded.is_empty() {
            error!("no plugins loaded, the LCD stays blank");
        }

        let mut buffer = vec![0u8; LCD_BUFFER_LEN];
        write_header(&mut buffer);

        Self {
            screens: loaded,
            current: 0,
            tick_counter: 0,
            locked: false,
            fonts,
            buffer,
        }
    }

    pub fn state(&self) -> SchedulerState {
        if self.screens.is_empty() {
            SchedulerState::NoPlugins
        } else {
            SchedulerState::Active { index: self.current, locked: self.locked }
        }
    }

    /// Compose one tick and return the device buffer.
    ///
    /// `key` is the key pressed since the last tick (empty for none);
    /// `enabled_mask` has one bit per plugin id.
    pub fn render_next_tick(&mut self, key: &str, enabled_mask: u64) -> &[u8] {
        if let Err(e) = self.compose_tick(key, enabled_mask) {
            error!("tick {} blanked: {}", self.tick_counter, e);
            self.buffer.fill(0);
        }
        write_header(&mut self.buffer);
        &self.buffer
    }

    fn compose_tick(&mut self, key: &str, enabled_mask: u64) -> LcdResult<()> {
        if self.screens.is_empty() {
            self.buffer.fill(0);
            return Ok(());
        }

        self.tick_counter = self.tick_counter.saturating_add(1);

        if key == LOCK_KEY {
            self.locked = !self.locked;
            info!("plugin {}", if self.locked { "locked" } else { "unlocked" });
            if self.locked {
                self.active_mut()?.core_mut().mark_locked();
            }
        }

        let (id, budget) = {
            let core = self.active()?.core();
            (core.identity().id, core.tempo().frames)
        };

        if id & enabled_mask == 0 {
            // a disabled screen cannot hold the display, lock or not
            self.locked = false;
            self.rotate(enabled_mask)?;
        } else if self.tick_counter >= budget {
            if self.locked {
                self.tick_counter = 0;
                self.active_mut()?.core_mut().advance_frame()?;
            } else {
                self.rotate(enabled_mask)?;
            }
        } else {
            self.active_mut()?.core_mut().advance_frame()?;
        }

        let locked = self.locked;
        let current = self.current;
        let screen = self
            .screens
            .get_mut(current)
            .ok_or_else(|| LcdError::Inconsistent(format!("no plugin at {}", current)))?;
        screen.refresh(&mut self.fonts)?;
        screen.core_mut().draw_padlock(locked, PADLOCK_X, PADLOCK_Y);
        write_device_frame(&mut self.buffer, screen.core().current_frame()?)?;

        debug!(
            "tick {} plugin {} frame {}",
            self.tick_counter,
            screen.identity().name,
            screen.core().frame_index()
        );
        Ok(())
    }

    /// Move to the next enabled screen after the current one, wrapping
    fn rotate(&mut self, enabled_mask: u64) -> LcdResult<()> {
        let len = self.screens.len();
        for step in 1..=len {
            let index = (self.current + step) % len;
            let screen = &mut self.screens[index];
            screen.core_mut().reset_ever_locked();
            if screen.identity().id & enabled_mask != 0 {
                screen.core_mut().reset_animation();
                info!("rotating to plugin {}", screen.identity().name);
                self.current = index;
                self.tick_counter = 0;
                return Ok(());
            }
        }
        Err(LcdError::AllDisabled(enabled_mask))
    }

    fn active(&self) -> LcdResult<&dyn Screen> {
        self.screens
            .get(self.current)
            .map(|s| &**s)
            .ok_or_else(|| LcdError::Inconsistent(format!("no plugin at {}", self.current)))
    }

    fn active_mut(&mut self) -> LcdResult<&mut Box<dyn Screen>> {
        let current = self.current;
        self.screens
            .get_mut(current)
            .ok_or_else(|| LcdError::Inconsistent(format!("no plugin at {}", current)))
    }

    /// Unlock and make the next tick rotate
    pub fn force_next_plugin(&mut self) {
        self.locked = false;
        if let Ok(budget) = self.active().map(|s| s.core().tempo().frames) {
            self.tick_counter = budget;
        }
    }

    pub fn has_enabled_plugin(&self, enabled_mask: u64) -> bool {
        self.screens.iter().any(|s| s.identity().id & enabled_mask != 0)
    }

    pub fn plugins_properties(&self) -> Vec<PluginProperties> {
        self.screens
            .iter()
            .map(|s| {
                let core = s.core();
                let identity = core.identity();
                PluginProperties {
                    id: identity.id,
                    name: identity.name.clone(),
                    description: identity.description.clone(),
                    interval_ms: core.tempo().interval_ms,
                    frames: core.tempo().frames,
                }
            })
            .collect()
    }

    /// Id of the screen on display, 0 without plugins
    pub fn current_plugin_id(&self) -> u64 {
        self.active().map(|s| s.identity().id).unwrap_or(0)
    }

    /// Tick interval the active screen asks for, in ms
    pub fn plugin_timing(&self) -> u16 {
        self.active()
            .map(|s| s.core().tempo().interval_ms)
            .unwrap_or(DEFAULT_PLUGIN_TIMING_MS)
    }

    pub fn is_locked(&self) -> bool { self.locked }
    pub fn tick_counter(&self) -> u16 { self.tick_counter }
    pub fn buffer(&self) -> &[u8] { &self.buffer }
    pub fn fonts_mut(&mut self) -> &mut FontCache { &mut self.fonts }

    /// Composed frame of the active screen, before transcoding
    pub fn current_frame(&self) -> Option<&PixelBuffer> {
        self.active().ok().and_then(|s| s.core().current_frame().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{LCD_HEADER_LEN, LCD_REPORT_ID};
    use crate::lcd::screen::{PluginIdentity, ScreenCore, Tempo};

    struct Stub {
        core: ScreenCore,
        frames: usize,
        fail: bool,
        fill: u8,
    }

    impl Stub {
        fn boxed(id: u64, budget: u16, frames: usize, fill: u8) -> Box<dyn Screen> {
            Box::new(Stub {
                core: ScreenCore::new(PluginIdentity::new(id, format!("stub{}", id), "stub"), Tempo::new(50, budget)),
                frames,
                fail: false,
                fill,
            })
        }

        fn failing(id: u64) -> Box<dyn Screen> {
            Box::new(Stub {
                core: ScreenCore::new(PluginIdentity::new(id, "broken", "stub"), Tempo::DEFAULT),
                frames: 1,
                fail: true,
                fill: 0,
            })
        }
    }

    impl Screen for Stub {
        fn core(&self) -> &ScreenCore { &self.core }
        fn core_mut(&mut self) -> &mut ScreenCore { &mut self.core }

        fn init(&mut self, _fonts: &mut FontCache, _ctx: &ScreenContext) -> LcdResult<()> {
            if self.fail {
                return Err(LcdError::Format("bad bitmap".into()));
            }
            // frame i lights row i, so frames are told apart on the wire
            for i in 0..self.frames {
                let mut frame = PixelBuffer::blank_frame();
                frame.as_mut_slice()[i * 20..(i + 1) * 20].fill(self.fill);
                self.core.add_frame(frame, 0)?;
            }
            Ok(())
        }
    }

    fn scheduler(screens: Vec<Box<dyn Screen>>) -> PluginScheduler {
        PluginScheduler::with_screens(
            FontCache::new("/nonexistent"),
            &ScreenContext::new("/nonexistent", "KEYMONS"),
            screens,
        )
    }

    #[test]
    fn test_rotation_after_budget() {
        let mut s = scheduler(vec![Stub::boxed(1, 3, 1, 0), Stub::boxed(2, 3, 1, 0)]);
        assert_eq!(s.state(), SchedulerState::Active { index: 0, locked: false });
        s.render_next_tick("", 0b11);
        s.render_next_tick("", 0b11);
        assert_eq!(s.current_plugin_id(), 1);
        s.render_next_tick("", 0b11);
        assert_eq!(s.current_plugin_id(), 2);
        assert_eq!(s.tick_counter(), 0);
    }

    #[test]
    fn test_mask_zero_is_blank() {
        let mut s = scheduler(vec![Stub::boxed(1, 3, 1, 0xff), Stub::boxed(2, 3, 1, 0xff)]);
        let buf = s.render_next_tick("", 0);
        assert_eq!(buf.len(), LCD_BUFFER_LEN);
        assert_eq!(buf[0], LCD_REPORT_ID);
        assert!(buf[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_disabled_screens_are_skipped() {
        let mut s = scheduler(vec![
            Stub::boxed(1, 3, 1, 0),
            Stub::boxed(2, 3, 1, 0),
            Stub::boxed(4, 3, 1, 0),
        ]);
        s.render_next_tick("", 0b101);
        // screen 0 still enabled, stays
        assert_eq!(s.current_plugin_id(), 1);
        s.force_next_plugin();
        s.render_next_tick("", 0b101);
        assert_eq!(s.current_plugin_id(), 4);
        // disabling the active one moves on immediately
        s.render_next_tick("", 0b001);
        assert_eq!(s.current_plugin_id(), 1);
    }

    #[test]
    fn test_lock_holds_screen() {
        let mut s = scheduler(vec![Stub::boxed(1, 2, 1, 0), Stub::boxed(2, 2, 1, 0)]);
        s.render_next_tick(LOCK_KEY, 0b11);
        assert!(s.is_locked());
        for _ in 0..10 {
            s.render_next_tick("", 0b11);
            assert_eq!(s.current_plugin_id(), 1);
        }
        s.render_next_tick(LOCK_KEY, 0b11);
        assert!(!s.is_locked());
        s.render_next_tick("", 0b11);
        assert_eq!(s.current_plugin_id(), 2);
    }

    #[test]
    fn test_padlock_drawn_in_device_buffer() {
        let mut s = scheduler(vec![Stub::boxed(1, 100, 1, 0)]);
        s.render_next_tick(LOCK_KEY, 1);
        let frame = s.current_frame().unwrap();
        // padlock top row is 0x70 at x 152
        assert!(frame.get_pixel(PADLOCK_X + 1, PADLOCK_Y));
        assert!(!frame.get_pixel(PADLOCK_X, PADLOCK_Y));

        // (153, 42): band 5, bit 2 of device byte 5*160 + 153
        let buf = s.buffer();
        assert_ne!(buf[LCD_HEADER_LEN + 5 * 160 + 153] & (1 << 2), 0);
    }

    #[test]
    fn test_force_next_unlocks() {
        let mut s = scheduler(vec![Stub::boxed(1, 20, 1, 0), Stub::boxed(2, 20, 1, 0)]);
        s.render_next_tick(LOCK_KEY, 0b11);
        s.force_next_plugin();
        assert!(!s.is_locked());
        s.render_next_tick("", 0b11);
        assert_eq!(s.current_plugin_id(), 2);
    }

    #[test]
    fn test_failed_screens_discarded() {
        let s = scheduler(vec![Stub::failing(1), Stub::boxed(2, 5, 0, 0), Stub::boxed(4, 5, 2, 0)]);
        // the frameless one fails to finish init too
        let props = s.plugins_properties();
        assert_eq!(props.len(), 1);
        assert_eq!(props[0].id, 4);
        assert_eq!(props[0].interval_ms, 50);
        assert!(s.has_enabled_plugin(4));
        assert!(!s.has_enabled_plugin(1 | 2));
    }

    #[test]
    fn test_no_plugins() {
        let mut s = scheduler(vec![Stub::failing(1)]);
        assert_eq!(s.state(), SchedulerState::NoPlugins);
        assert_eq!(s.current_plugin_id(), 0);
        assert_eq!(s.plugin_timing(), DEFAULT_PLUGIN_TIMING_MS);
        let buf = s.render_next_tick(LOCK_KEY, u64::MAX);
        assert_eq!(buf[0], LCD_REPORT_ID);
        assert!(buf[1..].iter().all(|&b| b == 0));
        assert!(s.current_frame().is_none());
    }

    #[test]
    fn test_animation_frames_cycle() {
        let mut s = scheduler(vec![Stub::boxed(1, 100, 2, 0xff)]);
        // display count 0: every tick moves to the other frame
        let ticks: Vec<Vec<u8>> = (0..3).map(|_| s.render_next_tick("", 1).to_vec()).collect();
        let (a, b, c) = (&ticks[0], &ticks[1], &ticks[2]);
        assert_ne!(a, b);
        assert_eq!(a, c);
        assert_eq!(a[0], LCD_REPORT_ID);
        // first tick already advanced onto frame 1 (row 1), then back to row 0
        let band = LCD_HEADER_LEN;
        assert_eq!(a[band] & 0b11, 0b10);
        assert_eq!(b[band] & 0b11, 0b01);
        assert!(a[band..band + 160].iter().all(|&x| x & 0b11 == 0b10));
        assert_eq!(s.tick_counter(), 3);
    }
}
