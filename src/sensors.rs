/*
 *  sensors.rs
 *
 *  KeyMonS - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  System readings handed to the monitor screen
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

use serde::Deserialize;

/// One sample of everything the system monitor shows.
///
/// Rates are preformatted by the collaborator (e.g. "12.3K/s").
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SensorSnapshot {
    pub hostname: String,
    pub cpu_percent: u8,
    pub memory_percent: u8,
    pub net_rx_rate: String,
    pub net_tx_rate: String,
}

impl Default for SensorSnapshot {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_string(),
            cpu_percent: 0,
            memory_percent: 0,
            net_rx_rate: "0B/s".to_string(),
            net_tx_rate: "0B/s".to_string(),
        }
    }
}

/// Where the monitor gets its readings, sampled once per refresh
pub trait SensorSource {
    fn sample(&mut self) -> SensorSnapshot;
}

/// A fixed snapshot is its own source
impl SensorSource for SensorSnapshot {
    fn sample(&mut self) -> SensorSnapshot {
        self.clone()
    }
}
