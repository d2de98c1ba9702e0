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

//! Export Freebox router telemetry in Graphite or InfluxDB line formats.
//!
//! ## Features
//!
//! Fbxmon logs in to the local API of a [Freebox](https://dev.freebox.fr/sdk/os/) server,
//! reads connection, system, switch, and disk statistics, and prints them on standard
//! output in either the Graphite plaintext protocol or the InfluxDB line protocol. It is
//! meant to be run periodically by something else (cron, or the Telegraf `exec` input)
//! which ships the output to a time series database.
//!
//! The following metrics are always exported:
//!
//! * `bytes_down`, `bytes_up` - Total bytes received and sent over the WAN connection.
//! * `rate_down`, `rate_up` - Current WAN throughput, in bytes per second.
//! * `bandwidth_down`, `bandwidth_up` - Available WAN bandwidth, in bits per second.
//! * `state` - `1` if the WAN connection is up, `0` otherwise.
//!
//! Depending on the connection medium, either fiber (`sfp_pwr_rx`, `sfp_pwr_tx`, `link`, ...)
//! or DSL (`xdsl_status`, `xdsl_down_snr`, `xdsl_up_attn`, ...) line metrics are exported
//! as well. System (`-H`), switch status (`-S`), switch port (`-P`), and internal disk
//! (`-D`) metrics can be enabled with flags.
//!
//! ## Register
//!
//! Before it can read anything, fbxmon must be registered with the Freebox. This only
//! needs to be done once per Freebox.
//!
//! ```text
//! fbxmon --register
//! ```
//!
//! Then press the right arrow on the front panel of the Freebox server to approve the
//! application. The track ID and app token issued by the Freebox are saved in the
//! credentials file (`~/.config/fbxmon/credentials.toml` on Linux). Check that the
//! approval went through with `fbxmon --register-status`.
//!
//! ## Run
//!
//! ```text
//! fbxmon --status-sys --status-switch --format influxdb
//! ```
//!
//! Diagnostics are logged to standard error, metrics are written to standard output.
//! If any request fails, nothing is written to standard output and fbxmon exits with
//! a non-zero status.
//!
//! ### Telegraf
//!
//! ```toml
//! [[inputs.exec]]
//!   commands = ["/usr/local/bin/fbxmon -H -S -P -f influxdb"]
//!   data_format = "influx"
//!   timeout = "10s"
//! ```
//!

pub mod auth;
pub mod client;
pub mod credentials;
pub mod error;
pub mod format;
pub mod register;
pub mod telemetry;
