/*
 *  lcd/screens/end_screen.rs
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

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyleBuilder, Rectangle, StrokeAlignment};

use crate::lcd::error::LcdResult;
use crate::lcd::fonts::{FontCache, FontId};
use crate::lcd::screen::{PluginIdentity, Screen, ScreenContext, ScreenCore, Tempo};

pub const END_SCREEN_ID: u64 = 1 << 2;

const PRODUCT_Y: i32 = 10;
const BYE_Y: i32 = 22;

/// Static goodbye card
pub struct EndScreen {
    core: ScreenCore,
}

impl EndScreen {
    pub fn new() -> Self {
        Self {
            core: ScreenCore::new(
                PluginIdentity::new(END_SCREEN_ID, "End Screen", "Shown when the session ends"),
                Tempo::DEFAULT,
            ),
        }
    }
}

impl Default for EndScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for EndScreen {
    fn core(&self) -> &ScreenCore { &self.core }
    fn core_mut(&mut self) -> &mut ScreenCore { &mut self.core }

    fn init(&mut self, fonts: &mut FontCache, ctx: &ScreenContext) -> LcdResult<()> {
        self.core.add_blank_frame(0)?;

        let border = PrimitiveStyleBuilder::new()
            .stroke_color(BinaryColor::On)
            .stroke_width(1)
            .stroke_alignment(StrokeAlignment::Inside)
            .build();
        let frame = self.core.last_frame_mut()?;
        Rectangle::new(Point::zero(), frame.size())
            .into_styled(border)
            .draw(frame)
            .unwrap_or_else(|never| match never {});

        self.core.write_string_on_last_frame(fonts, FontId::Monospace86, &ctx.product_name, -1, PRODUCT_Y);
        self.core.write_string_on_last_frame(fonts, FontId::DejaVuSansBold1616, "BYE", -1, BYE_Y);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_border_without_fonts() {
        let mut fonts = FontCache::new("/nonexistent");
        let ctx = ScreenContext::new("/nonexistent", "KEYMONS");
        let mut screen = EndScreen::new();
        // missing fonts only cost the text
        screen.init(&mut fonts, &ctx).unwrap();

        let frame = screen.core().current_frame().unwrap();
        assert!(frame.get_pixel(0, 0));
        assert!(frame.get_pixel(159, 47));
        assert!(frame.get_pixel(80, 0));
        assert!(frame.get_pixel(0, 24));
        assert!(!frame.get_pixel(1, 1));
        assert_eq!(frame.count_on_pixels(), 2 * 160 + 2 * 46);
    }
}
