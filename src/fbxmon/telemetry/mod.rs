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

mod collector;
mod connection;
mod sample;
mod storage;
mod switch;
mod system;

pub use crate::telemetry::collector::{Categories, Collector};
pub use crate::telemetry::connection::{ConnectionStatus, DslState, FtthStatus, Media, XdslStatus};
pub use crate::telemetry::sample::{MetricSample, MetricValue, Record};
pub use crate::telemetry::storage::DiskStatus;
pub use crate::telemetry::switch::{NumberedPortStats, PortStats, SwitchStatus, SWITCH_PORTS};
pub use crate::telemetry::system::SystemStatus;
