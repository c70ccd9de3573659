use crate::sdk::map::{LatLng, RendererConfig, Viewport};
use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {var}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// How a submitted form reaches the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// Fetch the results and render them on the current page.
    #[default]
    FetchInPlace,
    /// Go to the results page, which fetches on load.
    Navigate,
}

impl FromStr for InteractionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fetch" | "fetch-in-place" => Ok(Self::FetchInPlace),
            "navigate" => Ok(Self::Navigate),
            other => Err(format!("expected `fetch` or `navigate`, got `{}`", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub base_url: String,
    pub query_path: String,
    pub results_path: String,
    pub reset_path: String,
    pub mode: InteractionMode,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            query_path: "/query/".to_string(),
            results_path: "/results/".to_string(),
            reset_path: "/".to_string(),
            mode: InteractionMode::default(),
        }
    }
}

impl SearchConfig {
    /// Reads `GEOSEARCH_BASE_URL` and `GEOSEARCH_MODE`; unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(base_url) = lookup("GEOSEARCH_BASE_URL") {
            url::Url::parse(&base_url).map_err(|e| ConfigError::InvalidValue {
                var: "GEOSEARCH_BASE_URL",
                value: base_url.clone(),
                reason: e.to_string(),
            })?;
            config.base_url = base_url;
        }
        if let Some(mode) = parse_var(&lookup, "GEOSEARCH_MODE")? {
            config.mode = mode;
        }
        Ok(config)
    }
}

/// Renderer settings from `GEOSEARCH_*` variables on top of `RendererConfig::default()`.
pub fn renderer_config_from_env() -> Result<RendererConfig, ConfigError> {
    renderer_config_from_lookup(|key| env::var(key).ok())
}

pub fn renderer_config_from_lookup<F: Fn(&str) -> Option<String>>(
    lookup: F,
) -> Result<RendererConfig, ConfigError> {
    let mut config = RendererConfig::default();
    if let Some(zoom_out) = parse_float(&lookup, "GEOSEARCH_CONTEXT_ZOOM_OUT")? {
        config.context_zoom_out = zoom_out;
    }
    if let Some(padding) = parse_float(&lookup, "GEOSEARCH_FIT_PADDING")? {
        if padding < 0.0 {
            return Err(ConfigError::InvalidValue {
                var: "GEOSEARCH_FIT_PADDING",
                value: padding.to_string(),
                reason: "must not be negative".to_string(),
            });
        }
        config.fit_padding = padding;
    }
    let lat = parse_float(&lookup, "GEOSEARCH_DEFAULT_LAT")?.unwrap_or(config.default_view.center.lat);
    let lng = parse_float(&lookup, "GEOSEARCH_DEFAULT_LNG")?.unwrap_or(config.default_view.center.lng);
    let zoom = parse_float(&lookup, "GEOSEARCH_DEFAULT_ZOOM")?.unwrap_or(config.default_view.zoom);
    let center = LatLng::new(lat, lng);
    if !center.is_valid() {
        return Err(ConfigError::InvalidValue {
            var: "GEOSEARCH_DEFAULT_LAT/GEOSEARCH_DEFAULT_LNG",
            value: format!("{},{}", lat, lng),
            reason: "not a valid coordinate".to_string(),
        });
    }
    config.default_view = Viewport::new(center, zoom);
    Ok(config)
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: ToString,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                var,
                value,
                reason: e.to_string(),
            }),
    }
}

/// Like `parse_var`, but NaN and infinities are rejected.
fn parse_float<F>(lookup: &F, var: &'static str) -> Result<Option<f64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_var::<F, f64>(lookup, var)? {
        Some(value) if !value.is_finite() => Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
            reason: "must be a finite number".to_string(),
        }),
        parsed => Ok(parsed),
    }
}
