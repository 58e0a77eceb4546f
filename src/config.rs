use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use crate::color::Rgb;

/// Command-line configuration for the demo.
#[derive(Parser, Debug)]
#[command(name = "isoroll", version, about = "Isometric rolling-voxel field for the terminal")]
pub struct Config {
    /// Number of cube actors in the field
    #[arg(long, default_value_t = 48)]
    pub actors: usize,

    /// Initial projection zoom
    #[arg(long, default_value_t = 1.0)]
    pub zoom: f64,

    /// Roll progress increment per animation step, in (0, 1]
    #[arg(long, default_value_t = 0.05)]
    pub speed: f64,

    /// Maximum random idle wait between rolls, in milliseconds
    #[arg(long = "max-wait", default_value_t = 3000.0)]
    pub max_wait_ms: f64,

    /// Half-extent of the square lattice actors are recycled into
    #[arg(long = "spawn-range", default_value_t = 8)]
    pub spawn_range: i64,

    /// Opacity of the ground grid lines, 0 to 1
    #[arg(long = "grid-opacity", default_value_t = 0.25)]
    pub grid_opacity: f64,

    /// Lighting contrast ratio; the ambient floor is its reciprocal
    #[arg(long, default_value_t = 3.0)]
    pub contrast: f64,

    /// Comma-separated hex colors actors are painted from
    #[arg(long, default_value = "e63946,f4a261,2a9d8f,e9c46a,8ecae6")]
    pub palette: String,

    /// Visibility fraction at which a page section switches the background
    #[arg(long, default_value_t = 0.4)]
    pub threshold: f64,

    /// Seed for the random source; omit for an entropy seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Start with the debug overlay enabled
    #[arg(long)]
    pub debug: bool,

    /// Append tracing output to this file (stderr would fight the display)
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.actors == 0 {
            bail!("--actors must be at least 1");
        }
        if !(self.speed > 0.0 && self.speed <= 1.0) {
            bail!("--speed must be in (0, 1]");
        }
        if self.max_wait_ms <= 0.0 {
            bail!("--max-wait must be positive");
        }
        if self.spawn_range < 1 {
            bail!("--spawn-range must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.grid_opacity) {
            bail!("--grid-opacity must be between 0 and 1");
        }
        if self.contrast < 1.0 {
            bail!("--contrast must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            bail!("--threshold must be between 0 and 1");
        }
        if !(self.zoom > 0.0) {
            bail!("--zoom must be positive");
        }
        Ok(())
    }

    pub fn parse_palette(&self) -> Result<Vec<Rgb>> {
        let colors = self
            .palette
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                Rgb::from_hex(entry).with_context(|| format!("invalid palette color '{entry}'"))
            })
            .collect::<Result<Vec<_>>>()?;
        if colors.is_empty() {
            bail!("palette must contain at least one color");
        }
        Ok(colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("isoroll").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_pass_validation() {
        config(&[]).validate().unwrap();
    }

    #[test]
    fn parses_default_palette() {
        let palette = config(&[]).parse_palette().unwrap();
        assert_eq!(palette.len(), 5);
        assert_eq!(palette[0], Rgb::new(0xe6, 0x39, 0x46));
    }

    #[test]
    fn palette_accepts_hash_prefix_and_whitespace() {
        let palette = config(&["--palette", "#ff0000, 00ff00"]).parse_palette().unwrap();
        assert_eq!(palette, vec![Rgb::new(255, 0, 0), Rgb::new(0, 255, 0)]);
    }

    #[test]
    fn rejects_bad_palette_entry() {
        assert!(config(&["--palette", "ff0000,nope"]).parse_palette().is_err());
    }

    #[test]
    fn non_ascii_palette_entry_is_an_error_not_a_panic() {
        assert!(config(&["--palette", "aééa"]).parse_palette().is_err());
    }

    #[test]
    fn rejects_out_of_range_settings() {
        assert!(config(&["--speed", "0"]).validate().is_err());
        assert!(config(&["--speed", "1.5"]).validate().is_err());
        assert!(config(&["--contrast", "0.5"]).validate().is_err());
        assert!(config(&["--grid-opacity", "2"]).validate().is_err());
        assert!(config(&["--actors", "0"]).validate().is_err());
        assert!(config(&["--spawn-range", "0"]).validate().is_err());
    }
}
