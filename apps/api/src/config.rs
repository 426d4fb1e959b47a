use anyhow::{bail, Context, Result};

use crate::layout::{default_grid_geometry, GridGeometry};

/// Service configuration loaded from environment variables.
/// Startup fails if a value is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Upper bound on articles per layout request.
    pub max_articles: usize,
    /// Must match the reading site's grid stylesheet.
    pub geometry: GridGeometry,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = default_grid_geometry();
        let geometry = GridGeometry {
            columns: defaults.columns,
            col_width_px: parse_or(&lookup, "LAYOUT_COL_WIDTH_PX", defaults.col_width_px)?,
            char_width_px: parse_or(&lookup, "LAYOUT_CHAR_WIDTH_PX", defaults.char_width_px)?,
            line_height_px: parse_or(&lookup, "LAYOUT_LINE_HEIGHT_PX", defaults.line_height_px)?,
            padding_px: parse_or(&lookup, "LAYOUT_PADDING_PX", defaults.padding_px)?,
            header_height_px: parse_or(
                &lookup,
                "LAYOUT_HEADER_HEIGHT_PX",
                defaults.header_height_px,
            )?,
            cell_height_px: parse_or(&lookup, "LAYOUT_CELL_HEIGHT_PX", defaults.cell_height_px)?,
            gap_px: parse_or(&lookup, "LAYOUT_GAP_PX", defaults.gap_px)?,
        };
        validate_geometry(&geometry)?;

        Ok(Config {
            port: parse_or(&lookup, "PORT", 8080u16)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            max_articles: parse_or(&lookup, "LAYOUT_MAX_ARTICLES", 500usize)?,
            geometry,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

fn validate_geometry(g: &GridGeometry) -> Result<()> {
    let values = [
        ("LAYOUT_COL_WIDTH_PX", g.col_width_px),
        ("LAYOUT_CHAR_WIDTH_PX", g.char_width_px),
        ("LAYOUT_LINE_HEIGHT_PX", g.line_height_px),
        ("LAYOUT_PADDING_PX", g.padding_px),
        ("LAYOUT_HEADER_HEIGHT_PX", g.header_height_px),
        ("LAYOUT_CELL_HEIGHT_PX", g.cell_height_px),
        ("LAYOUT_GAP_PX", g.gap_px),
    ];
    for (key, value) in values {
        if !value.is_finite() || value < 0.0 {
            bail!("{key} must be a finite, non-negative number");
        }
    }
    if g.col_width_px <= 0.0 {
        bail!("LAYOUT_COL_WIDTH_PX must be greater than zero");
    }
    if g.char_width_px <= 0.0 {
        bail!("LAYOUT_CHAR_WIDTH_PX must be greater than zero");
    }
    if g.row_pitch_px() <= 0.0 {
        bail!("LAYOUT_CELL_HEIGHT_PX + LAYOUT_GAP_PX must be greater than zero");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
        assert_eq!(config.max_articles, 500);
        assert_eq!(config.geometry, default_grid_geometry());
    }

    #[test]
    fn test_geometry_overrides() {
        let config = config_from(&[("LAYOUT_COL_WIDTH_PX", "96"), ("LAYOUT_GAP_PX", " 12 ")]).unwrap();
        assert_eq!(config.geometry.col_width_px, 96.0);
        assert_eq!(config.geometry.gap_px, 12.0);
        assert_eq!(config.geometry.cell_height_px, 10.0);
    }

    #[test]
    fn test_bad_port_is_rejected() {
        let err = config_from(&[("PORT", "http")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_zero_char_width_is_rejected() {
        let err = config_from(&[("LAYOUT_CHAR_WIDTH_PX", "0")]).unwrap_err();
        assert!(err.to_string().contains("LAYOUT_CHAR_WIDTH_PX"));
    }

    #[test]
    fn test_negative_padding_is_rejected() {
        assert!(config_from(&[("LAYOUT_PADDING_PX", "-4")]).is_err());
    }
}
