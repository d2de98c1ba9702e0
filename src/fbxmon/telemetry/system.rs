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

use crate::telemetry::sample::{MetricSample, Record};
use serde::Deserialize;

/// Result of `system/`. Temperatures are in degrees celsius.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SystemStatus {
    pub fan_rpm: Option<u64>,
    pub temp_sw: Option<i64>,
    pub temp_cpum: Option<i64>,
    pub temp_cpub: Option<i64>,
    pub uptime_val: Option<u64>,
    pub firmware_version: Option<String>,
}

impl Record for SystemStatus {
    fn record(&self, sample: &mut MetricSample) {
        sample.insert_opt("sys_fan_rpm", self.fan_rpm);
        sample.insert_opt("sys_temp_sw", self.temp_sw);
        sample.insert_opt("sys_temp_cpum", self.temp_cpum);
        sample.insert_opt("sys_temp_cpub", self.temp_cpub);
        sample.insert_opt("sys_uptime_val", self.uptime_val);
        sample.insert_opt("sys_firmware_version", self.firmware_version.clone());
    }
}
