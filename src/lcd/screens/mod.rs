/*
 *  lcd/screens/mod.rs
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

pub mod splash;
pub mod system_monitor;
pub mod end_screen;

// Re-exports
pub use splash::{SplashScreen, SPLASH_ID};
pub use system_monitor::{SystemMonitor, SYSTEM_MONITOR_ID};
pub use end_screen::{EndScreen, END_SCREEN_ID};

use crate::lcd::screen::Screen;
use crate::sensors::SensorSource;

/// Every built-in screen, in rotation order
pub fn builtin_screens(sensors: Box<dyn SensorSource>) -> Vec<Box<dyn Screen>> {
    vec![
        Box::new(SplashScreen::new()),
        Box::new(SystemMonitor::new(sensors)),
        Box::new(EndScreen::new()),
    ]
}
