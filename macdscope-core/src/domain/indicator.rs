//! Indicator series returned alongside a market fetch.
//!
//! Series are aligned to the candle timestamps but may be shorter (warm-up points
//! the backend reports as null are dropped) or start later.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::market::{first_non_increasing, DatasetError};
use super::timestamp::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    pub timestamp: Timestamp,
    pub value: f64,
}

/// A named single-valued series such as `EMA_200`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSeries<LinePoint>")]
pub struct LineSeries {
    pub name: String,
    points: Vec<LinePoint>,
}

/// Unchecked decode target; the public series types validate through `new`.
#[derive(Deserialize)]
struct RawSeries<P> {
    name: String,
    points: Vec<P>,
}

impl TryFrom<RawSeries<LinePoint>> for LineSeries {
    type Error = DatasetError;

    fn try_from(raw: RawSeries<LinePoint>) -> Result<Self, Self::Error> {
        Self::new(raw.name, raw.points)
    }
}

impl LineSeries {
    pub fn new(name: impl Into<String>, points: Vec<LinePoint>) -> Result<Self, DatasetError> {
        let stamps: Vec<Timestamp> = points.iter().map(|p| p.timestamp).collect();
        if let Some(index) = first_non_increasing(&stamps) {
            return Err(DatasetError::NotIncreasing { index });
        }
        Ok(Self {
            name: name.into(),
            points,
        })
    }

    pub fn points(&self) -> &[LinePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// One oscillator sample. The histogram is always derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OscillatorPoint {
    pub timestamp: Timestamp,
    pub value: f64,
    pub signal: f64,
}

impl OscillatorPoint {
    pub fn histogram(&self) -> f64 {
        self.value - self.signal
    }
}

/// MACD-style oscillator: value line, signal line, histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSeries<OscillatorPoint>")]
pub struct OscillatorSeries {
    pub name: String,
    points: Vec<OscillatorPoint>,
}

impl TryFrom<RawSeries<OscillatorPoint>> for OscillatorSeries {
    type Error = DatasetError;

    fn try_from(raw: RawSeries<OscillatorPoint>) -> Result<Self, Self::Error> {
        Self::new(raw.name, raw.points)
    }
}

impl OscillatorSeries {
    pub fn new(name: impl Into<String>, points: Vec<OscillatorPoint>) -> Result<Self, DatasetError> {
        let stamps: Vec<Timestamp> = points.iter().map(|p| p.timestamp).collect();
        if let Some(index) = first_non_increasing(&stamps) {
            return Err(DatasetError::NotIncreasing { index });
        }
        Ok(Self {
            name: name.into(),
            points,
        })
    }

    pub fn points(&self) -> &[OscillatorPoint] {
        &self.points
    }

    pub fn timestamps(&self) -> impl Iterator<Item = &Timestamp> + '_ {
        self.points.iter().map(|p| &p.timestamp)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&OscillatorPoint> {
        self.points.last()
    }
}

/// Everything indicator-shaped that came back with a fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub lines: BTreeMap<String, LineSeries>,
    pub oscillator: Option<OscillatorSeries>,
}

impl IndicatorSet {
    pub fn with_line(mut self, series: LineSeries) -> Self {
        self.lines.insert(series.name.clone(), series);
        self
    }

    pub fn with_oscillator(mut self, series: OscillatorSeries) -> Self {
        self.oscillator = Some(series);
        self
    }

    /// The trend overlay: the preferred series if present, otherwise the first
    /// line whose name starts with `EMA`.
    pub fn trend(&self, preferred: &str) -> Option<&LineSeries> {
        self.lines.get(preferred).or_else(|| {
            self.lines
                .values()
                .find(|s| s.name.to_ascii_uppercase().starts_with("EMA"))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.oscillator.is_none()
    }
}
