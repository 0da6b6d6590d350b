/*
 *  lcd/screens/system_monitor.rs
 *
 *  KeyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Host name, CPU and memory load bars, network rates
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

use arrayvec::ArrayString;
use core::fmt::Write;

use crate::lcd::error::LcdResult;
use crate::lcd::fonts::{FontCache, FontId};
use crate::lcd::screen::{PluginIdentity, Screen, ScreenContext, ScreenCore, Tempo};
use crate::sensors::SensorSource;

pub const SYSTEM_MONITOR_ID: u64 = 1 << 1;

// layout, in pixels
const HOSTNAME_Y: i32 = 1;
const LABEL_X: i32 = 2;
const BAR_X: u16 = 24;
const CPU_BAR_Y: u16 = 12;
const MEM_BAR_Y: u16 = 22;
const PERCENT_X: i32 = 130;
const SEPARATOR_X: u16 = 80;
const SEPARATOR_Y: u16 = 33;
const SEPARATOR_ROWS: u16 = 9;
const RATE_Y: i32 = 34;
const RATE_GAP: u16 = 3;

pub struct SystemMonitor {
    core: ScreenCore,
    sensors: Box<dyn SensorSource>,
}

impl SystemMonitor {
    pub fn new(sensors: Box<dyn SensorSource>) -> Self {
        Self {
            core: ScreenCore::new(
                PluginIdentity::new(SYSTEM_MONITOR_ID, "System Monitor", "CPU, memory and network"),
                Tempo::DEFAULT,
            ),
            sensors,
        }
    }

    fn percent_text(percent: u8) -> ArrayString<8> {
        let mut buf = ArrayString::new();
        let _ = write!(&mut buf, "{:>3}%", percent.min(100));
        buf
    }

    fn draw_load(&mut self, fonts: &mut FontCache, label: &str, percent: u8, bar_y: u16) {
        let text_y = bar_y as i32;
        self.core.write_string(fonts, FontId::Monospace85, label, LABEL_X, text_y);
        self.core.draw_progress_bar(percent, BAR_X, bar_y);
        let pct = Self::percent_text(percent);
        self.core.write_string(fonts, FontId::Monospace85, &pct, PERCENT_X, text_y);
    }
}

impl Screen for SystemMonitor {
    fn core(&self) -> &ScreenCore { &self.core }
    fn core_mut(&mut self) -> &mut ScreenCore { &mut self.core }

    fn init(&mut self, _fonts: &mut FontCache, _ctx: &ScreenContext) -> LcdResult<()> {
        self.core.add_blank_frame(0)
    }

    fn refresh(&mut self, fonts: &mut FontCache) -> LcdResult<()> {
        let snap = self.sensors.sample();
        self.core.clear_current_frame();

        self.core.write_string(fonts, FontId::Monospace86, &snap.hostname, -1, HOSTNAME_Y);
        self.draw_load(fonts, "CPU", snap.cpu_percent, CPU_BAR_Y);
        self.draw_load(fonts, "MEM", snap.memory_percent, MEM_BAR_Y);

        self.core.draw_vertical_line(SEPARATOR_X, SEPARATOR_Y, SEPARATOR_ROWS);

        // tx ends just left of the separator, rx starts just right of it
        let tx_width = fonts
            .atlas(FontId::Monospace85)
            .map(|a| a.text_width(&snap.net_tx_rate))
            .unwrap_or(0);
        let tx_x = SEPARATOR_X.saturating_sub(RATE_GAP + tx_width);
        self.core.write_string(fonts, FontId::Monospace85, &snap.net_tx_rate, tx_x as i32, RATE_Y);
        self.core.write_string(
            fonts,
            FontId::Monospace85,
            &snap.net_rx_rate,
            (SEPARATOR_X + RATE_GAP) as i32,
            RATE_Y,
        );
        Ok(())
    }
}
