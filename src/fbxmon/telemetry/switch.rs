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

/// Ethernet ports on the back of the Freebox server
pub const SWITCH_PORTS: [u8; 4] = [1, 2, 3, 4];

/// One entry of `switch/status/`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PortStatus {
    pub id: u8,
    pub link: Option<String>,
    pub mode: Option<String>,
}

impl PortStatus {
    /// Whether the port has a link, `None` if the Freebox didn't say.
    pub fn is_up(&self) -> Option<bool> {
        self.link.as_deref().map(|l| l == "up")
    }
}

/// Result of `switch/status/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SwitchStatus {
    pub ports: Vec<PortStatus>,
}

impl Record for SwitchStatus {
    fn record(&self, sample: &mut MetricSample) {
        for port in &self.ports {
            sample.insert_opt(format!("switch_{}_link", port.id), port.is_up());
            sample.insert_opt(format!("switch_{}_mode", port.id), port.mode.clone());
        }
    }
}

/// Result of `switch/port/{id}/stats/`. Rates are in bytes per second.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PortStats {
    pub rx_bytes_rate: Option<u64>,
    pub tx_bytes_rate: Option<u64>,
    pub rx_good_bytes: Option<u64>,
    pub tx_bytes: Option<u64>,
    pub rx_good_packets: Option<u64>,
    pub tx_packets: Option<u64>,
    pub rx_err_packets: Option<u64>,
    pub tx_collisions: Option<u64>,
}

/// Statistics of a single switch port, tagged with the port number so they
/// can be recorded under distinct names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedPortStats {
    pub id: u8,
    pub stats: PortStats,
}

impl Record for NumberedPortStats {
    fn record(&self, sample: &mut MetricSample) {
        let name = |field: &str| format!("switch_{}_{}", self.id, field);
        let s = &self.stats;

        sample.insert_opt(name("rx_bytes_rate"), s.rx_bytes_rate);
        sample.insert_opt(name("tx_bytes_rate"), s.tx_bytes_rate);
        sample.insert_opt(name("rx_good_bytes"), s.rx_good_bytes);
        sample.insert_opt(name("tx_bytes"), s.tx_bytes);
        sample.insert_opt(name("rx_good_packets"), s.rx_good_packets);
        sample.insert_opt(name("tx_packets"), s.tx_packets);
        sample.insert_opt(name("rx_err_packets"), s.rx_err_packets);
        sample.insert_opt(name("tx_collisions"), s.tx_collisions);
    }
}
