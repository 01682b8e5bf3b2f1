//! Run configuration and its validation.

use crate::{LumiError, LumiResult};
use std::fmt;

/// Arguments as typed on the command line, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawArgs {
    /// Brightness, default `"1"`.
    pub brightness: String,
    /// Display index, default `"0"`.
    pub display: String,
    /// Target gamma, default `"1"`.
    pub gamma: String,
    /// Target temperature in Kelvin, default `"6500"`.
    pub temperature: String,
}

impl Default for RawArgs {
    fn default() -> Self {
        Self {
            brightness: "1".into(),
            display: "0".into(),
            gamma: "1".into(),
            temperature: "6500".into(),
        }
    }
}

/// Validated settings for one run.
///
/// Brightness is clamped to `[0, 1]` here and never rescaled afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Index into the list of display devices.
    pub display_index: usize,
    /// Target gamma, `> 0`.
    pub gamma: f64,
    /// White point temperature in Kelvin, `> 0`.
    pub temperature_kelvin: f64,
    /// Brightness scale in `[0, 1]`.
    pub brightness: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display_index: 0,
            gamma: 1.0,
            temperature_kelvin: 6500.0,
            brightness: 1.0,
        }
    }
}

impl Config {
    /// Validates numeric values; brightness is clamped rather than rejected.
    pub fn new(
        display_index: usize,
        gamma: f64,
        temperature_kelvin: f64,
        brightness: f64,
    ) -> LumiResult<Self> {
        if !gamma.is_finite() || gamma <= 0.0 {
            return Err(invalid("gamma", gamma, "must be greater than zero"));
        }
        if !temperature_kelvin.is_finite() || temperature_kelvin <= 0.0 {
            return Err(invalid("temperature", temperature_kelvin, "must be greater than zero"));
        }
        if brightness.is_nan() {
            return Err(invalid("brightness", brightness, "not a number"));
        }
        Ok(Self {
            display_index,
            gamma,
            temperature_kelvin,
            brightness: brightness.clamp(0.0, 1.0),
        })
    }

    /// Parses and validates command-line strings.
    ///
    /// ```rust
    /// use lumi_core::{Config, RawArgs};
    ///
    /// let raw = RawArgs { brightness: "1.7".into(), ..RawArgs::default() };
    /// let config = Config::from_raw(&raw).unwrap();
    /// assert_eq!(config.brightness, 1.0);
    /// ```
    pub fn from_raw(raw: &RawArgs) -> LumiResult<Self> {
        let display_index = raw
            .display
            .trim()
            .parse::<usize>()
            .map_err(|e| parse_error("display", &raw.display, e))?;
        let gamma = parse_real("gamma", &raw.gamma)?;
        let temperature = parse_real("temperature", &raw.temperature)?;
        let brightness = parse_real("brightness", &raw.brightness)?;
        Self::new(display_index, gamma, temperature, brightness)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "display {} gamma {} temperature {}K brightness {}",
            self.display_index, self.gamma, self.temperature_kelvin, self.brightness
        )
    }
}

fn parse_real(field: &'static str, value: &str) -> LumiResult<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|e| parse_error(field, value, e))
}

fn parse_error(field: &'static str, value: &str, err: impl fmt::Display) -> LumiError {
    LumiError::Configuration {
        field,
        value: value.to_string(),
        reason: err.to_string(),
    }
}

fn invalid(field: &'static str, value: f64, reason: &str) -> LumiError {
    LumiError::Configuration {
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(brightness: &str, display: &str, gamma: &str, temperature: &str) -> RawArgs {
        RawArgs {
            brightness: brightness.into(),
            display: display.into(),
            gamma: gamma.into(),
            temperature: temperature.into(),
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_raw(&RawArgs::default()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_brightness_clamped() {
        assert_eq!(Config::from_raw(&raw("2.5", "0", "1", "6500")).unwrap().brightness, 1.0);
        assert_eq!(Config::from_raw(&raw("-3", "0", "1", "6500")).unwrap().brightness, 0.0);
        assert_eq!(Config::from_raw(&raw("0.4", "0", "1", "6500")).unwrap().brightness, 0.4);
    }

    #[test]
    fn test_parses_everything() {
        let config = Config::from_raw(&raw("0.8", "2", "2.2", "4500")).unwrap();
        assert_eq!(config.display_index, 2);
        assert_eq!(config.gamma, 2.2);
        assert_eq!(config.temperature_kelvin, 4500.0);
        assert_eq!(config.brightness, 0.8);
    }

    #[test]
    fn test_malformed_numbers() {
        for (args, field) in [
            (raw("bright", "0", "1", "6500"), "brightness"),
            (raw("1", "first", "1", "6500"), "display"),
            (raw("1", "-1", "1", "6500"), "display"),
            (raw("1", "0", "", "6500"), "gamma"),
            (raw("1", "0", "1", "warm"), "temperature"),
            (raw("nan", "0", "1", "6500"), "brightness"),
        ] {
            match Config::from_raw(&args) {
                Err(LumiError::Configuration { field: f, .. }) => assert_eq!(f, field),
                other => panic!("expected configuration error for {}, got {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_gamma_must_be_positive() {
        assert!(Config::from_raw(&raw("1", "0", "0", "6500")).is_err());
        assert!(Config::from_raw(&raw("1", "0", "-2.2", "6500")).is_err());
        assert!(Config::from_raw(&raw("1", "0", "inf", "6500")).is_err());
    }

    #[test]
    fn test_temperature_must_be_positive() {
        assert!(Config::from_raw(&raw("1", "0", "1", "0")).is_err());
        assert!(Config::from_raw(&raw("1", "0", "1", "-6500")).is_err());
    }
}
