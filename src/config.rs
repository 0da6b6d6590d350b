use serde::{Deserialize, Serialize};
use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::sensors::SensorSnapshot;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_PRODUCT_NAME: &str = "KeyMonS";
pub const DEFAULT_TICKS: u32 = 60;

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration, every field optional so layers can stack.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// General options
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    /// LCD compositor and preview run
    pub lcd: Option<LcdConfig>,
    /// Static readings for the system monitor
    pub sensors: Option<SensorsConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LcdConfig {
    pub data_dir: Option<PathBuf>,     // fonts and splash bitmaps
    pub product_name: Option<String>,
    pub plugins_mask: Option<u64>,     // one bit per plugin id
    pub ticks: Option<u32>,
    pub realtime: Option<bool>,        // sleep the advertised interval between ticks
    pub lock_tick: Option<u32>,        // press the lock key on this tick
    pub dump_frame: Option<PathBuf>,   // last composed frame as PBM
    pub dump_buffer: Option<PathBuf>,  // last device buffer, raw
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SensorsConfig {
    pub hostname: Option<String>,
    pub cpu_percent: Option<u8>,
    pub memory_percent: Option<u8>,
    pub net_rx_rate: Option<String>,
    pub net_tx_rate: Option<String>,
}

/// LCD settings with every default filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LcdSettings {
    pub data_dir: PathBuf,
    pub product_name: String,
    pub plugins_mask: u64,
    pub ticks: u32,
    pub realtime: bool,
    pub lock_tick: Option<u32>,
    pub dump_frame: Option<PathBuf>,
    pub dump_buffer: Option<PathBuf>,
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone)]
#[command(name = "keymons", about = "KeyMonS keyboard LCD compositor", disable_help_flag = false)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// Directory holding the font sheets and splash bitmap
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub data_dir: Option<PathBuf>,
    #[arg(long)]
    pub product_name: Option<String>,
    /// Plugin enable mask, decimal or 0x hex
    #[arg(long, value_parser = parse_mask)]
    pub plugins_mask: Option<u64>,
    #[arg(long)]
    pub ticks: Option<u32>,
    #[arg(long, action = ArgAction::Set)]
    pub realtime: Option<bool>,
    #[arg(long)]
    pub lock_tick: Option<u32>,
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub dump_frame: Option<PathBuf>,
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub dump_buffer: Option<PathBuf>,
    #[arg(long)]
    pub hostname: Option<String>,
    /// debug logging, same as --log-level debug
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub debug: bool,
    /// print the loaded plugin table and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub list_plugins: bool,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

fn parse_mask(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    };
    parsed.map_err(|e| format!("bad plugin mask {s:?}: {e}"))
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<(Config, Cli), ConfigError> {
    let cli = Cli::parse();
    let cfg = load_with(&cli)?;

    if cli.dump_config {
        // Pretty YAML of effective config (nice for debugging)
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok((cfg, cli))
}

/// Layer defaults, YAML and `cli`, then validate
pub fn load_with(cli: &Cli) -> Result<Config, ConfigError> {
    load_with_search(cli, true)
}

/// As [`load_with`]; without `--config`, the usual locations are only
/// searched when `search` is set
pub fn load_with_search(cli: &Cli, search: bool) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = search.then(find_config_file).flatten() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;
    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/keymons/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/keymons/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/keymons.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["keymons.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some()      { dst.log_level = src.log_level; }
    match (&mut dst.lcd, src.lcd) {
        (None, Some(c)) => dst.lcd = Some(c),
        (Some(d), Some(s)) => merge_lcd(d, s),
        _ => {}
    }
    match (&mut dst.sensors, src.sensors) {
        (None, Some(c)) => dst.sensors = Some(c),
        (Some(d), Some(s)) => merge_sensors(d, s),
        _ => {}
    }
}

fn merge_lcd(dst: &mut LcdConfig, src: LcdConfig) {
    if src.data_dir.is_some()      { dst.data_dir = src.data_dir; }
    if src.product_name.is_some()  { dst.product_name = src.product_name; }
    if src.plugins_mask.is_some()  { dst.plugins_mask = src.plugins_mask; }
    if src.ticks.is_some()         { dst.ticks = src.ticks; }
    if src.realtime.is_some()      { dst.realtime = src.realtime; }
    if src.lock_tick.is_some()     { dst.lock_tick = src.lock_tick; }
    if src.dump_frame.is_some()    { dst.dump_frame = src.dump_frame; }
    if src.dump_buffer.is_some()   { dst.dump_buffer = src.dump_buffer; }
}

fn merge_sensors(dst: &mut SensorsConfig, src: SensorsConfig) {
    if src.hostname.is_some()        { dst.hostname = src.hostname; }
    if src.cpu_percent.is_some()     { dst.cpu_percent = src.cpu_percent; }
    if src.memory_percent.is_some()  { dst.memory_percent = src.memory_percent; }
    if src.net_rx_rate.is_some()     { dst.net_rx_rate = src.net_rx_rate; }
    if src.net_tx_rate.is_some()     { dst.net_tx_rate = src.net_tx_rate; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some()       { cfg.log_level = cli.log_level.clone(); }
    if cli.debug                     { cfg.log_level = Some("debug".into()); }

    let any_lcd = cli.data_dir.is_some()
        || cli.product_name.is_some()
        || cli.plugins_mask.is_some()
        || cli.ticks.is_some()
        || cli.realtime.is_some()
        || cli.lock_tick.is_some()
        || cli.dump_frame.is_some()
        || cli.dump_buffer.is_some();

    if any_lcd && cfg.lcd.is_none() {
        cfg.lcd = Some(LcdConfig::default());
    }
    if let Some(lcd) = cfg.lcd.as_mut() {
        if cli.data_dir.is_some()      { lcd.data_dir = cli.data_dir.clone(); }
        if cli.product_name.is_some()  { lcd.product_name = cli.product_name.clone(); }
        if cli.plugins_mask.is_some()  { lcd.plugins_mask = cli.plugins_mask; }
        if cli.ticks.is_some()         { lcd.ticks = cli.ticks; }
        if cli.realtime.is_some()      { lcd.realtime = cli.realtime; }
        if cli.lock_tick.is_some()     { lcd.lock_tick = cli.lock_tick; }
        if cli.dump_frame.is_some()    { lcd.dump_frame = cli.dump_frame.clone(); }
        if cli.dump_buffer.is_some()   { lcd.dump_buffer = cli.dump_buffer.clone(); }
    }

    if let Some(host) = cli.hostname.as_ref() {
        cfg.sensors.get_or_insert_with(SensorsConfig::default).hostname = Some(host.clone());
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(level) = cfg.log_level.as_deref() {
        if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Validation(format!("log_level must be one of {:?}", LOG_LEVELS)));
        }
    }
    if let Some(lcd) = cfg.lcd.as_ref() {
        if let Some(name) = lcd.product_name.as_deref() {
            if name.trim().is_empty() {
                return Err(ConfigError::Validation("lcd product_name must not be empty".into()));
            }
        }
        if lcd.ticks == Some(0) {
            return Err(ConfigError::Validation("lcd ticks must be > 0".into()));
        }
        if let Some(lock) = lcd.lock_tick {
            let ticks = lcd.ticks.unwrap_or(DEFAULT_TICKS);
            if lock == 0 || lock > ticks {
                return Err(ConfigError::Validation(format!("lcd lock_tick must be in 1..={ticks}")));
            }
        }
    }
    if let Some(sensors) = cfg.sensors.as_ref() {
        for (name, value) in [("cpu_percent", sensors.cpu_percent), ("memory_percent", sensors.memory_percent)] {
            if value.is_some_and(|v| v > 100) {
                return Err(ConfigError::Validation(format!("sensors {name} must be 0..=100")));
            }
        }
    }
    Ok(())
}

impl Config {
    /// Filter for env_logger when RUST_LOG is not set
    pub fn log_filter(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    pub fn lcd_settings(&self) -> LcdSettings {
        let lcd = self.lcd.clone().unwrap_or_default();
        LcdSettings {
            data_dir: lcd.data_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            product_name: lcd.product_name.unwrap_or_else(|| DEFAULT_PRODUCT_NAME.to_string()),
            plugins_mask: lcd.plugins_mask.unwrap_or(u64::MAX),
            ticks: lcd.ticks.unwrap_or(DEFAULT_TICKS),
            realtime: lcd.realtime.unwrap_or(false),
            lock_tick: lcd.lock_tick,
            dump_frame: lcd.dump_frame,
            dump_buffer: lcd.dump_buffer,
        }
    }

    /// Readings for the monitor screen; unset fields keep their defaults
    pub fn sensor_snapshot(&self) -> SensorSnapshot {
        let mut snap = SensorSnapshot::default();
        if let Ok(host) = std::env::var("HOSTNAME") {
            if !host.is_empty() { snap.hostname = host; }
        }
        if let Some(s) = self.sensors.clone() {
            if let Some(v) = s.hostname       { snap.hostname = v; }
            if let Some(v) = s.cpu_percent    { snap.cpu_percent = v; }
            if let Some(v) = s.memory_percent { snap.memory_percent = v; }
            if let Some(v) = s.net_rx_rate    { snap.net_rx_rate = v; }
            if let Some(v) = s.net_tx_rate    { snap.net_tx_rate = v; }
        }
        snap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["keymons"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    /// Never looks at $HOME or the working directory
    fn load_args(args: &[&str]) -> Result<Config, ConfigError> {
        load_with_search(&cli(args), false)
    }

    fn yaml_file(body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_defaults() {
        let s = Config::default().lcd_settings();
        assert_eq!(s.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
        assert_eq!(s.product_name, DEFAULT_PRODUCT_NAME);
        assert_eq!(s.plugins_mask, u64::MAX);
        assert_eq!(s.ticks, DEFAULT_TICKS);
        assert!(!s.realtime);
        assert_eq!(Config::default().log_filter(), "info");
    }

    #[test]
    fn test_yaml_then_cli() {
        let f = yaml_file(
            "log_level: warn\nlcd:\n  product_name: G15\n  ticks: 10\n  plugins_mask: 3\nsensors:\n  cpu_percent: 50\n",
        );
        let path = f.path().to_str().unwrap().to_string();
        let cfg = load_with(&cli(&["--config", &path, "--ticks", "25", "--plugins-mask", "0x4"])).unwrap();

        let s = cfg.lcd_settings();
        assert_eq!(s.product_name, "G15");
        assert_eq!(s.ticks, 25);
        assert_eq!(s.plugins_mask, 4);
        assert_eq!(cfg.log_filter(), "warn");
        assert_eq!(cfg.sensor_snapshot().cpu_percent, 50);
    }

    #[test]
    fn test_debug_flag_wins() {
        let cfg = load_args(&["--log-level", "error", "-d"]).unwrap();
        assert_eq!(cfg.log_filter(), "debug");
    }

    #[test]
    fn test_hostname_override() {
        let cfg = load_args(&["--hostname", "rig"]).unwrap();
        assert_eq!(cfg.sensor_snapshot().hostname, "rig");
    }

    #[test]
    fn test_no_search_means_defaults() {
        let s = load_args(&[]).unwrap().lcd_settings();
        let d = Config::default().lcd_settings();
        assert_eq!(s.data_dir, d.data_dir);
        assert_eq!(s.product_name, d.product_name);
        assert_eq!(s.plugins_mask, d.plugins_mask);
        assert_eq!(s.ticks, d.ticks);
        assert_eq!(s.lock_tick, d.lock_tick);
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut dst = Config {
            lcd: Some(LcdConfig { ticks: Some(5), realtime: Some(true), ..Default::default() }),
            ..Default::default()
        };
        let src = Config {
            lcd: Some(LcdConfig { ticks: Some(9), ..Default::default() }),
            ..Default::default()
        };
        merge(&mut dst, src);
        let lcd = dst.lcd.unwrap();
        assert_eq!(lcd.ticks, Some(9));
        assert_eq!(lcd.realtime, Some(true));
    }

    #[test]
    fn test_validation() {
        assert!(matches!(load_args(&["--ticks", "0"]), Err(ConfigError::Validation(_))));
        assert!(matches!(load_args(&["--ticks", "5", "--lock-tick", "6"]), Err(ConfigError::Validation(_))));
        assert!(matches!(load_args(&["--log-level", "loud"]), Err(ConfigError::Validation(_))));
        assert!(matches!(load_args(&["--product-name", " "]), Err(ConfigError::Validation(_))));
        assert!(load_args(&["--ticks", "5", "--lock-tick", "5"]).is_ok());

        let f = yaml_file("sensors:\n  memory_percent: 101\n");
        let path = f.path().to_str().unwrap().to_string();
        assert!(matches!(load_with(&cli(&["--config", &path])), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_missing_or_bad_file() {
        assert!(matches!(
            load_with(&cli(&["--config", "/nonexistent/keymons.yaml"])),
            Err(ConfigError::Validation(_))
        ));
        let f = yaml_file("lcd: [not, a, map]\n");
        let path = f.path().to_str().unwrap().to_string();
        assert!(matches!(load_with(&cli(&["--config", &path])), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_parse_mask() {
        assert_eq!(parse_mask("7"), Ok(7));
        assert_eq!(parse_mask("0xff"), Ok(255));
        assert!(parse_mask("zz").is_err());
    }
}
