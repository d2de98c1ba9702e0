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

use crate::telemetry::{MetricSample, MetricValue};
use std::io::{self, Write};

pub const DEFAULT_PREFIX: &str = "freebox";

/// Text formats a sample can be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// `<prefix>.<name> <value> <timestamp>`, numeric metrics only
    Graphite,
    /// `<measurement>,endpoint=<host> <name>=<value>`
    #[value(name = "influxdb")]
    InfluxDb,
}

/// Writes every metric of a sample as one line of text.
pub trait LineFormat {
    fn write_sample(&self, sample: &MetricSample, out: &mut dyn Write) -> io::Result<()>;
}

/// Graphite plaintext protocol. Graphite only stores numbers so text metrics
/// are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graphite {
    prefix: String,
}

impl Graphite {
    pub fn new<S: Into<String>>(prefix: S) -> Self {
        Graphite { prefix: prefix.into() }
    }
}

impl LineFormat for Graphite {
    fn write_sample(&self, sample: &MetricSample, out: &mut dyn Write) -> io::Result<()> {
        for (name, value) in sample.iter() {
            if !value.is_numeric() {
                tracing::debug!(message = "skipping text metric for graphite", name = name);
                continue;
            }

            writeln!(out, "{}.{} {} {}", self.prefix, name, value, sample.timestamp())?;
        }

        Ok(())
    }
}

/// InfluxDB line protocol, one line per metric tagged with the endpoint the
/// metrics were read from. Timestamps are left for the server to assign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfluxDb {
    measurement: String,
    endpoint: String,
}

impl InfluxDb {
    pub fn new<M: Into<String>, E: Into<String>>(measurement: M, endpoint: E) -> Self {
        InfluxDb {
            measurement: measurement.into(),
            endpoint: endpoint.into(),
        }
    }
}

impl LineFormat for InfluxDb {
    fn write_sample(&self, sample: &MetricSample, out: &mut dyn Write) -> io::Result<()> {
        let measurement = escape(&self.measurement, &[',', ' ']);
        let endpoint = escape(&self.endpoint, &[',', '=', ' ']);

        for (name, value) in sample.iter() {
            let name = escape(name, &[',', '=', ' ']);
            match value {
                MetricValue::Text(s) => writeln!(
                    out,
                    "{},endpoint={} {}=\"{}\"",
                    measurement,
                    endpoint,
                    name,
                    escape(s, &['"'])
                )?,
                v => writeln!(out, "{},endpoint={} {}={}", measurement, endpoint, name, v)?,
            }
        }

        Ok(())
    }
}

/// Backslash escape the given characters (and backslashes themselves).
fn escape(s: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '\\' || special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }

    out
}
