//! Shared types and small data operations used across the crate.

use std::fmt;
use std::str::FromStr;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// The ionisation mode of an MS function, as reported by the MassLynx SDK.
///
/// Raw files number their acquisition functions rather than naming them, so traces are
/// looked up by the ion mode string of each function (`ES+`, `ES-`, ...). Strings the
/// crate does not know are kept verbatim in [`IonTraceMode::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IonTraceMode {
    /// Electrospray, positive (`ES+`)
    EsPositive,
    /// Electrospray, negative (`ES-`)
    EsNegative,
    /// Atmospheric pressure chemical ionisation, positive (`AI+`)
    ApciPositive,
    /// Atmospheric pressure chemical ionisation, negative (`AI-`)
    ApciNegative,
    /// Electron impact, positive (`EI+`)
    EiPositive,
    /// Electron impact, negative (`EI-`)
    EiNegative,
    /// Chemical ionisation, positive (`CI+`)
    CiPositive,
    /// Chemical ionisation, negative (`CI-`)
    CiNegative,
    /// Fast atom bombardment, positive (`FB+`)
    FabPositive,
    /// Fast atom bombardment, negative (`FB-`)
    FabNegative,
    /// Thermospray, positive (`TS+`)
    TsPositive,
    /// Thermospray, negative (`TS-`)
    TsNegative,
    /// Laser desorption, positive (`LD+`)
    LdPositive,
    /// Laser desorption, negative (`LD-`)
    LdNegative,
    /// Any other mode string
    Other(String),
}

const KNOWN_MODES: [(IonTraceMode, &str); 14] = [
    (IonTraceMode::EsPositive, "ES+"),
    (IonTraceMode::EsNegative, "ES-"),
    (IonTraceMode::ApciPositive, "AI+"),
    (IonTraceMode::ApciNegative, "AI-"),
    (IonTraceMode::EiPositive, "EI+"),
    (IonTraceMode::EiNegative, "EI-"),
    (IonTraceMode::CiPositive, "CI+"),
    (IonTraceMode::CiNegative, "CI-"),
    (IonTraceMode::FabPositive, "FB+"),
    (IonTraceMode::FabNegative, "FB-"),
    (IonTraceMode::TsPositive, "TS+"),
    (IonTraceMode::TsNegative, "TS-"),
    (IonTraceMode::LdPositive, "LD+"),
    (IonTraceMode::LdNegative, "LD-"),
];

impl IonTraceMode {
    /// The SDK string for this mode
    pub fn as_str(&self) -> &str {
        if let IonTraceMode::Other(label) = self {
            return label;
        }
        KNOWN_MODES
            .iter()
            .find(|(mode, _)| mode == self)
            .map(|(_, label)| *label)
            .unwrap_or_default()
    }

    /// Polarity of the mode: `Some(1)` positive, `Some(-1)` negative, `None` if unknown.
    pub fn polarity(&self) -> Option<i8> {
        match self.as_str().chars().last() {
            Some('+') => Some(1),
            Some('-') => Some(-1),
            _ => None,
        }
    }
}

impl fmt::Display for IonTraceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IonTraceMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(KNOWN_MODES
            .iter()
            .find(|(_, label)| label.eq_ignore_ascii_case(s))
            .map(|(mode, _)| mode.clone())
            .unwrap_or_else(|| IonTraceMode::Other(s.to_string())))
    }
}

impl From<&str> for IonTraceMode {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(mode) => mode,
            Err(never) => match never {},
        }
    }
}

impl Serialize for IonTraceMode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for IonTraceMode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(IonTraceMode::from(s.as_str()))
    }
}

/// A retention time in minutes.
///
/// Times can be given as plain minutes or as a [`TimeDelta`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RetentionTime(f64);

impl RetentionTime {
    /// Create a retention time from minutes
    pub fn from_minutes(minutes: f64) -> Self {
        Self(minutes)
    }

    /// The retention time in minutes
    pub fn as_minutes(&self) -> f64 {
        self.0
    }

    /// The retention time in seconds
    pub fn as_seconds(&self) -> f64 {
        self.0 * 60.0
    }

    /// Convert to a [`TimeDelta`], rounded to the nearest microsecond.
    pub fn to_time_delta(&self) -> TimeDelta {
        TimeDelta::microseconds((self.0 * 60_000_000.0).round() as i64)
    }
}

impl From<f64> for RetentionTime {
    fn from(minutes: f64) -> Self {
        Self(minutes)
    }
}

impl From<TimeDelta> for RetentionTime {
    fn from(delta: TimeDelta) -> Self {
        let minutes = match delta.num_microseconds() {
            Some(us) => us as f64 / 60_000_000.0,
            None => delta.num_milliseconds() as f64 / 60_000.0,
        };
        Self(minutes)
    }
}

impl fmt::Display for RetentionTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} min", self.0)
    }
}

/// Scale `values` so that the largest value is 1.0.
///
/// Values are returned unchanged when the maximum is not positive.
pub fn normalised(values: &[f64]) -> Vec<f64> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max > 0.0 && max.is_finite() {
        values.iter().map(|v| v / max).collect()
    } else {
        values.to_vec()
    }
}
