/*
 *  main.rs
 *
 *  KeyMonS - worth the squeeze
 *	(c) 2020-26 Stuart Hunter
 *
 *	Preview runner: composes the keyboard LCD for a number of ticks and
 *	dumps what the device would receive
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use std::fs::{self, File};
use std::io::BufWriter;
use std::{thread, time::Duration};

use anyhow::{Context, Result};
use env_logger::Env;
use log::{info, warn};

use keymons::config;
use keymons::constants::LOCK_KEY;
use keymons::lcd::{FontCache, FontId, PluginScheduler, ScreenContext};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

fn main() -> Result<()> {
    let (cfg, cli) = config::load().context("loading configuration")?;

    env_logger::Builder::from_env(Env::default().default_filter_or(cfg.log_filter()))
        .format_timestamp_secs()
        .init();

    info!("This {} worth the Squeeze", env!("CARGO_PKG_NAME"));
    info!(
        "v.{} built {} ({} {})",
        env!("CARGO_PKG_VERSION"),
        BUILD_DATE,
        BUILD_PROFILE,
        BUILD_TARGET
    );

    let lcd = cfg.lcd_settings();
    info!("data directory {}", lcd.data_dir.display());

    let ctx = ScreenContext::new(&lcd.data_dir, &lcd.product_name);
    let fonts = FontCache::new(&lcd.data_dir);
    let mut scheduler = PluginScheduler::new(fonts, &ctx, Box::new(cfg.sensor_snapshot()));

    // screens only pull the fonts they use, report the rest up front
    let fonts = scheduler.fonts_mut();
    for id in FontId::ALL {
        if let Some(e) = fonts.atlas(id).err() {
            warn!("font {:?} unavailable in {}: {}", id, fonts.data_dir().display(), e);
        }
    }

    if cli.list_plugins {
        println!("{:<18} {:<16} {:>6} {:>6}  description", "id", "name", "ms", "ticks");
        for p in scheduler.plugins_properties() {
            println!(
                "{:#018x} {:<16} {:>6} {:>6}  {}",
                p.id, p.name, p.interval_ms, p.frames, p.description
            );
        }
        return Ok(());
    }

    if !scheduler.has_enabled_plugin(lcd.plugins_mask) {
        warn!("mask {:#x} enables no loaded plugin, every tick will be blank", lcd.plugins_mask);
    }

    for tick in 1..=lcd.ticks {
        let key = if lcd.lock_tick == Some(tick) { LOCK_KEY } else { "" };
        scheduler.render_next_tick(key, lcd.plugins_mask);
        if lcd.realtime {
            thread::sleep(Duration::from_millis(scheduler.plugin_timing() as u64));
        }
    }
    info!(
        "{} tick(s) done on plugin {:#x}{}",
        lcd.ticks,
        scheduler.current_plugin_id(),
        if scheduler.is_locked() { " (locked)" } else { "" }
    );

    if let Some(path) = lcd.dump_buffer.as_ref() {
        fs::write(path, scheduler.buffer())
            .with_context(|| format!("writing device buffer to {}", path.display()))?;
        info!("device buffer written to {}", path.display());
    }

    if let Some(path) = lcd.dump_frame.as_ref() {
        match scheduler.current_frame() {
            Some(frame) => {
                let out = File::create(path)
                    .with_context(|| format!("creating {}", path.display()))?;
                frame
                    .write_pbm(BufWriter::new(out))
                    .with_context(|| format!("writing frame to {}", path.display()))?;
                info!("frame written to {}", path.display());
            }
            None => warn!("no plugin loaded, no frame to write"),
        }
    }

    Ok(())
}
