/*
 *  lcd/mod.rs
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

pub mod error;
pub mod framebuffer;
pub mod pbm;
pub mod atlas;
pub mod fonts;
pub mod draw;
pub mod frame;
pub mod screen;
pub mod screens;
pub mod scheduler;
pub mod transcode;

// Re-exports
pub use error::{LcdError, LcdResult};
pub use framebuffer::PixelBuffer;
pub use pbm::{load_pbm, parse_pbm};
pub use atlas::{CharTable, FontSpec, GlyphAtlas};
pub use fonts::{FontCache, FontId};
pub use frame::AnimationFrame;
pub use screen::{PluginIdentity, Screen, ScreenContext, ScreenCore, Tempo};
pub use scheduler::{PluginProperties, PluginScheduler, SchedulerState};
pub use transcode::{transcode, write_device_frame};
