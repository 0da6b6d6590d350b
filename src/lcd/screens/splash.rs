/*
 *  lcd/screens/splash.rs
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

use crate::constants::{LCD_WIDTH, SPLASH_PBM};
use crate::lcd::error::LcdResult;
use crate::lcd::fonts::{FontCache, FontId};
use crate::lcd::screen::{PluginIdentity, Screen, ScreenContext, ScreenCore, Tempo};

pub const SPLASH_ID: u64 = 1 << 0;

const SPLASH_VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));
const PRODUCT_Y: i32 = 38;
const LOGO_TICKS: u16 = 10;
const BRANDED_TICKS: u16 = 20;

/// Logo bitmap, then the same bitmap with product name and version
pub struct SplashScreen {
    core: ScreenCore,
}

impl SplashScreen {
    pub fn new() -> Self {
        Self {
            core: ScreenCore::new(
                PluginIdentity::new(SPLASH_ID, "Splash", "Logo and product name"),
                Tempo::RAPID,
            ),
        }
    }
}

impl Default for SplashScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for SplashScreen {
    fn core(&self) -> &ScreenCore { &self.core }
    fn core_mut(&mut self) -> &mut ScreenCore { &mut self.core }

    fn init(&mut self, fonts: &mut FontCache, ctx: &ScreenContext) -> LcdResult<()> {
        self.core.add_frame_from_file(&ctx.data_dir.join(SPLASH_PBM), LOGO_TICKS)?;
        let logo = self.core.last_frame_mut()?.clone();
        self.core.add_frame(logo, BRANDED_TICKS)?;

        self.core.write_string_on_last_frame(fonts, FontId::Monospace85, &ctx.product_name, -1, PRODUCT_Y);

        // right aligned on the top row
        let version_x = fonts
            .atlas(FontId::Monospace85)
            .map(|a| LCD_WIDTH.saturating_sub(a.text_width(SPLASH_VERSION)))
            .unwrap_or(0);
        self.core.write_string_on_last_frame(fonts, FontId::Monospace85, SPLASH_VERSION, version_x as i32, 0);
        Ok(())
    }
}
