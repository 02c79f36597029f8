/*
 *  config.rs
 *
 *  LumiPane - pixels on cue
 *  (c) 2020-26 Stuart Hunter
 *
 *  Layered configuration: defaults, YAML file, CLI overrides
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

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::brightness::BrightnessConfig;
use crate::display::EngineConfig;

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

/// Top-level app configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// e.g., "info" | "debug"
    pub log_level: Option<String>,
    pub display: Option<DisplayConfig>,
    pub brightness: Option<BrightnessSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Base redraw cadence in milliseconds
    pub refresh_ms: Option<u64>,
    /// How long the volume overlay stays visible, milliseconds
    pub volume_window_ms: Option<u64>,
    /// Logo/symbol cache re-resolve window, seconds
    pub asset_refresh_secs: Option<u64>,
    /// Menu rows in the viewport
    pub menu_visible: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BrightnessSection {
    pub bright: Option<u8>,
    pub dim: Option<u8>,
    pub dim_after_secs: Option<u64>,
    pub fade_step: Option<u8>,
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone)]
#[command(name = "lumipane", about = "LumiPane display engine", disable_help_flag = false)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    #[arg(long)]
    pub display_width: Option<u32>,
    #[arg(long)]
    pub display_height: Option<u32>,
    #[arg(long)]
    pub refresh_ms: Option<u64>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<(Config, Cli), ConfigError> {
    let cli = Cli::parse();
    let cfg = load_from(&cli)?;
    Ok((cfg, cli))
}

pub fn load_from(cli: &Cli) -> Result<Config, ConfigError> {
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
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides
    if cli.log_level.is_some() {
        cfg.log_level = cli.log_level.clone();
    }
    let display = cfg.display.get_or_insert_with(DisplayConfig::default);
    if cli.display_width.is_some() {
        display.width = cli.display_width;
    }
    if cli.display_height.is_some() {
        display.height = cli.display_height;
    }
    if cli.refresh_ms.is_some() {
        display.refresh_ms = cli.refresh_ms;
    }

    validate(&cfg)?;
    Ok(cfg)
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&text)?)
}

fn find_config_file() -> Option<PathBuf> {
    let mut candidates = vec![PathBuf::from("lumipane.yaml")];
    if let Some(h) = home_dir() {
        candidates.push(h.join(".config/lumipane/config.yaml"));
    }
    candidates.into_iter().find(|p| p.exists())
}

fn merge(base: &mut Config, over: Config) {
    if over.log_level.is_some() {
        base.log_level = over.log_level;
    }
    if let Some(d) = over.display {
        let b = base.display.get_or_insert_with(DisplayConfig::default);
        if d.width.is_some() { b.width = d.width; }
        if d.height.is_some() { b.height = d.height; }
        if d.refresh_ms.is_some() { b.refresh_ms = d.refresh_ms; }
        if d.volume_window_ms.is_some() { b.volume_window_ms = d.volume_window_ms; }
        if d.asset_refresh_secs.is_some() { b.asset_refresh_secs = d.asset_refresh_secs; }
        if d.menu_visible.is_some() { b.menu_visible = d.menu_visible; }
    }
    if let Some(br) = over.brightness {
        let b = base.brightness.get_or_insert_with(BrightnessSection::default);
        if br.bright.is_some() { b.bright = br.bright; }
        if br.dim.is_some() { b.dim = br.dim; }
        if br.dim_after_secs.is_some() { b.dim_after_secs = br.dim_after_secs; }
        if br.fade_step.is_some() { b.fade_step = br.fade_step; }
    }
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(d) = &cfg.display {
        if matches!(d.width, Some(0)) || matches!(d.height, Some(0)) {
            return Err(ConfigError::Validation("display geometry must be nonzero".into()));
        }
        if matches!(d.refresh_ms, Some(0)) {
            return Err(ConfigError::Validation("refresh_ms must be nonzero".into()));
        }
    }
    if let Some(b) = &cfg.brightness {
        if let (Some(bright), Some(dim)) = (b.bright, b.dim) {
            if dim > bright {
                return Err(ConfigError::Validation("brightness: dim level above bright level".into()));
            }
        }
    }
    Ok(())
}

impl Config {
    /// Fold the merged config into the engine's runtime settings
    pub fn engine_config(&self) -> EngineConfig {
        let defaults = EngineConfig::default();
        let d = self.display.clone().unwrap_or_default();
        let b = self.brightness.clone().unwrap_or_default();
        let bd = BrightnessConfig::default();

        EngineConfig {
            width: d.width.unwrap_or(defaults.width),
            height: d.height.unwrap_or(defaults.height),
            refresh: d.refresh_ms.map(Duration::from_millis).unwrap_or(defaults.refresh),
            volume_window: d
                .volume_window_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.volume_window),
            asset_refresh: d
                .asset_refresh_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.asset_refresh),
            menu_visible: d.menu_visible.unwrap_or(defaults.menu_visible),
            brightness: BrightnessConfig {
                bright: b.bright.unwrap_or(bd.bright),
                dim: b.dim.unwrap_or(bd.dim),
                dim_after: b
                    .dim_after_secs
                    .map(Duration::from_secs)
                    .unwrap_or(bd.dim_after),
                fade_step: b.fade_step.unwrap_or(bd.fade_step),
            },
        }
    }
}
