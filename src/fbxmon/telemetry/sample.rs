// Fbxmon - Freebox telemetry exporter for Graphite and InfluxDB
//
// Copyright 2022 Nick Pillitteri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

use std::fmt::{self, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Value of a single metric
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl MetricValue {
    pub fn is_numeric(&self) -> bool {
        !matches!(self, MetricValue::Text(_))
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Integer(v) => write!(f, "{}", v),
            MetricValue::Float(v) => write!(f, "{}", v),
            MetricValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::Integer(v)
    }
}

impl From<u64> for MetricValue {
    fn from(v: u64) -> Self {
        i64::try_from(v)
            .map(MetricValue::Integer)
            .unwrap_or(MetricValue::Float(v as f64))
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Float(v)
    }
}

impl From<bool> for MetricValue {
    fn from(v: bool) -> Self {
        MetricValue::Integer(i64::from(v))
    }
}

impl From<String> for MetricValue {
    fn from(v: String) -> Self {
        MetricValue::Text(v)
    }
}

impl From<&str> for MetricValue {
    fn from(v: &str) -> Self {
        MetricValue::Text(v.to_owned())
    }
}

/// All metrics gathered during a single run, in the order they were recorded,
/// along with the time the sample was started.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    timestamp: u64,
    values: Vec<(String, MetricValue)>,
}

impl MetricSample {
    /// Create an empty sample timestamped with the current time.
    pub fn new() -> Self {
        // Zero if the clock is set before the epoch
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self::at(timestamp)
    }

    /// Create an empty sample with a fixed UNIX timestamp, in seconds.
    pub fn at(timestamp: u64) -> Self {
        MetricSample {
            timestamp,
            values: Vec::new(),
        }
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Record a metric. Recording a name twice replaces the value but keeps the
    /// original position.
    pub fn insert<K, V>(&mut self, name: K, value: V)
    where
        K: Into<String>,
        V: Into<MetricValue>,
    {
        let name = name.into();
        let value = value.into();

        match self.values.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.values.push((name, value)),
        }
    }

    /// Record a metric only if it is present.
    pub fn insert_opt<K, V>(&mut self, name: K, value: Option<V>)
    where
        K: Into<String>,
        V: Into<MetricValue>,
    {
        if let Some(v) = value {
            self.insert(name, v);
        }
    }

    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.values.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Default for MetricSample {
    fn default() -> Self {
        Self::new()
    }
}

/// Typed API response that knows how to flatten itself into a sample.
pub trait Record {
    fn record(&self, sample: &mut MetricSample);
}
