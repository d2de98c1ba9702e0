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

/// Physical medium of the WAN connection, used to pick which line specific
/// statistics to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Media {
    Ftth,
    Xdsl,
    #[serde(other)]
    Other,
}

/// Result of `connection/`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionStatus {
    pub state: String,
    pub media: Media,
    pub bytes_down: u64,
    pub bytes_up: u64,
    pub rate_down: u64,
    pub rate_up: u64,
    pub bandwidth_down: Option<u64>,
    pub bandwidth_up: Option<u64>,
}

impl ConnectionStatus {
    pub fn is_up(&self) -> bool {
        self.state == "up"
    }
}

impl Record for ConnectionStatus {
    fn record(&self, sample: &mut MetricSample) {
        sample.insert("bytes_down", self.bytes_down);
        sample.insert("bytes_up", self.bytes_up);
        sample.insert("rate_down", self.rate_down);
        sample.insert("rate_up", self.rate_up);
        sample.insert_opt("bandwidth_down", self.bandwidth_down);
        sample.insert_opt("bandwidth_up", self.bandwidth_up);
        sample.insert("state", self.is_up());
    }
}

/// Result of `connection/ftth/`. Power levels are in hundredths of dBm and are
/// only reported by SFP modules that support it. Flags the Freebox leaves out
/// are not recorded rather than reported as false.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FtthStatus {
    pub sfp_present: Option<bool>,
    pub sfp_alim_ok: Option<bool>,
    pub sfp_has_signal: Option<bool>,
    pub link: Option<bool>,
    pub sfp_pwr_rx: Option<i64>,
    pub sfp_pwr_tx: Option<i64>,
}

impl Record for FtthStatus {
    fn record(&self, sample: &mut MetricSample) {
        sample.insert_opt("sfp_pwr_rx", self.sfp_pwr_rx);
        sample.insert_opt("sfp_pwr_tx", self.sfp_pwr_tx);
        sample.insert_opt("sfp_present", self.sfp_present);
        sample.insert_opt("sfp_alim_ok", self.sfp_alim_ok);
        sample.insert_opt("sfp_has_signal", self.sfp_has_signal);
        sample.insert_opt("link", self.link);
    }
}

/// Synchronization state of a DSL line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DslState {
    Unsynchronized,
    Training,
    Started,
    ChannelAnalysis,
    MessageExchange,
    Ready,
    Disabled,
    Unknown,
}

impl DslState {
    pub fn from_api(s: &str) -> Self {
        match s {
            "down" | "unsynchronized" => DslState::Unsynchronized,
            "training" => DslState::Training,
            "started" => DslState::Started,
            "chan_analysis" => DslState::ChannelAnalysis,
            "msg_exchange" => DslState::MessageExchange,
            "showtime" | "ready" => DslState::Ready,
            "disabled" => DslState::Disabled,
            _ => DslState::Unknown,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            DslState::Unsynchronized => 0,
            DslState::Training => 1,
            DslState::Started => 2,
            DslState::ChannelAnalysis => 3,
            DslState::MessageExchange => 4,
            DslState::Ready => 5,
            DslState::Disabled => 6,
            DslState::Unknown => 999,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct XdslLine {
    pub status: Option<String>,
    pub modulation: Option<String>,
    pub protocol: Option<String>,
    pub uptime: Option<u64>,
}

/// Per direction line statistics. Which of these are populated depends on the
/// DSL protocol and on the Freebox firmware.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct XdslStats {
    pub attn: Option<i64>,
    pub snr: Option<i64>,
    pub rate: Option<u64>,
    pub maxrate: Option<u64>,
    pub es: Option<u64>,
    pub ses: Option<u64>,
    pub crc: Option<u64>,
    pub hec: Option<u64>,
    pub fec: Option<u64>,
    pub rtx_tx: Option<u64>,
    pub rtx_c: Option<u64>,
    pub rtx_uc: Option<u64>,
}

impl XdslStats {
    fn record_direction(&self, direction: &str, sample: &mut MetricSample) {
        let name = |field: &str| format!("xdsl_{}_{}", direction, field);

        sample.insert_opt(name("attn"), self.attn);
        sample.insert_opt(name("snr"), self.snr);
        sample.insert_opt(name("rate"), self.rate);
        sample.insert_opt(name("maxrate"), self.maxrate);
        sample.insert_opt(name("es"), self.es);
        sample.insert_opt(name("ses"), self.ses);
        sample.insert_opt(name("crc"), self.crc);
        sample.insert_opt(name("hec"), self.hec);
        sample.insert_opt(name("fec"), self.fec);
        sample.insert_opt(name("rtx_tx"), self.rtx_tx);
        sample.insert_opt(name("rtx_c"), self.rtx_c);
        sample.insert_opt(name("rtx_uc"), self.rtx_uc);
    }
}

/// Result of `connection/xdsl/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct XdslStatus {
    #[serde(default)]
    pub status: XdslLine,
    pub down: Option<XdslStats>,
    pub up: Option<XdslStats>,
}

impl XdslStatus {
    pub fn state(&self) -> Option<DslState> {
        self.status.status.as_deref().map(DslState::from_api)
    }
}

impl Record for XdslStatus {
    fn record(&self, sample: &mut MetricSample) {
        sample.insert_opt("xdsl_status", self.state().map(|s| s.code()));
        sample.insert_opt("xdsl_modulation", self.status.modulation.clone());
        sample.insert_opt("xdsl_protocol", self.status.protocol.clone());
        sample.insert_opt("xdsl_uptime", self.status.uptime);

        if let Some(down) = &self.down {
            down.record_direction("down", sample);
        }

        if let Some(up) = &self.up {
            up.record_direction("up", sample);
        }
    }
}

#[cfg(test)]
mod test {
    use super::{ConnectionStatus, DslState, FtthStatus, Media, XdslStatus};
    use crate::telemetry::sample::{MetricSample, MetricValue, Record};

    #[test]
    fn test_dsl_state_known() {
        assert_eq!(0, DslState::from_api("down").code());
        assert_eq!(0, DslState::from_api("unsynchronized").code());
        assert_eq!(3, DslState::from_api("chan_analysis").code());
        assert_eq!(5, DslState::from_api("showtime").code());
        assert_eq!(5, DslState::from_api("ready").code());
        assert_eq!(6, DslState::from_api("disabled").code());
    }

    #[test]
    fn test_dsl_state_unknown() {
        assert_eq!(DslState::Unknown, DslState::from_api("exploded"));
        assert_eq!(999, DslState::from_api("exploded").code());
        assert_eq!(999, DslState::from_api("").code());
    }

    #[test]
    fn test_connection_record() {
        let status: ConnectionStatus = serde_json::from_str(
            r#"{"type": "ethernet", "rate_down": 2000, "bytes_up": 300, "ipv4": "203.0.113.7",
                "media": "ftth", "state": "up", "bytes_down": 1000, "rate_up": 50,
                "bandwidth_down": 1000000000}"#,
        )
        .unwrap();

        let mut sample = MetricSample::at(0);
        status.record(&mut sample);

        assert_eq!(Media::Ftth, status.media);
        assert_eq!(Some(&MetricValue::Integer(1000)), sample.get("bytes_down"));
        assert_eq!(Some(&MetricValue::Integer(1)), sample.get("state"));
        assert_eq!(Some(&MetricValue::Integer(1_000_000_000)), sample.get("bandwidth_down"));
        assert!(!sample.contains("bandwidth_up"));
    }

    #[test]
    fn test_connection_other_media_down() {
        let status: ConnectionStatus = serde_json::from_str(
            r#"{"media": "backup_4g", "state": "going_up", "bytes_down": 0, "bytes_up": 0,
                "rate_down": 0, "rate_up": 0}"#,
        )
        .unwrap();

        let mut sample = MetricSample::at(0);
        status.record(&mut sample);

        assert_eq!(Media::Other, status.media);
        assert_eq!(Some(&MetricValue::Integer(0)), sample.get("state"));
    }

    #[test]
    fn test_ftth_record_without_power_report() {
        let status: FtthStatus =
            serde_json::from_str(r#"{"sfp_present": true, "sfp_alim_ok": true, "sfp_has_signal": true, "link": true}"#)
                .unwrap();

        let mut sample = MetricSample::at(0);
        status.record(&mut sample);

        assert!(!sample.contains("sfp_pwr_rx"));
        assert_eq!(Some(&MetricValue::Integer(1)), sample.get("link"));
    }

    #[test]
    fn test_ftth_record_missing_flags() {
        let status: FtthStatus = serde_json::from_str(r#"{"sfp_pwr_rx": -1200, "link": false}"#).unwrap();

        let mut sample = MetricSample::at(0);
        status.record(&mut sample);

        assert_eq!(2, sample.len());
        assert_eq!(Some(&MetricValue::Integer(-1200)), sample.get("sfp_pwr_rx"));
        assert_eq!(Some(&MetricValue::Integer(0)), sample.get("link"));
        assert!(!sample.contains("sfp_present"));
        assert!(!sample.contains("sfp_alim_ok"));
        assert!(!sample.contains("sfp_has_signal"));
    }

    #[test]
    fn test_xdsl_record_complete() {
        let status: XdslStatus = serde_json::from_str(
            r#"{"status": {"status": "showtime", "protocol": "adsl2plus_a", "modulation": "adsl", "uptime": 3600},
                "down": {"attn": 32, "snr": 8, "rate": 12000, "maxrate": 14000, "es": 1, "ses": 0,
                         "crc": 5, "hec": 0, "fec": 200, "rtx_tx": 3, "rtx_c": 2, "rtx_uc": 1},
                "up": {"attn": 19, "snr": 10, "rate": 1000, "maxrate": 1100}}"#,
        )
        .unwrap();

        let mut sample = MetricSample::at(0);
        status.record(&mut sample);

        assert_eq!(Some(&MetricValue::Integer(5)), sample.get("xdsl_status"));
        assert_eq!(Some(&MetricValue::Text("adsl".to_owned())), sample.get("xdsl_modulation"));
        assert_eq!(Some(&MetricValue::Integer(8)), sample.get("xdsl_down_snr"));
        assert_eq!(Some(&MetricValue::Integer(1)), sample.get("xdsl_down_rtx_uc"));
        assert_eq!(Some(&MetricValue::Integer(19)), sample.get("xdsl_up_attn"));
        assert!(!sample.contains("xdsl_up_rtx_tx"));
    }

    #[test]
    fn test_xdsl_record_missing_fields() {
        let status: XdslStatus = serde_json::from_str(r#"{"status": {"status": "training"}}"#).unwrap();

        let mut sample = MetricSample::at(0);
        status.record(&mut sample);

        assert_eq!(1, sample.len());
        assert_eq!(Some(&MetricValue::Integer(1)), sample.get("xdsl_status"));
        assert!(!sample.contains("xdsl_down_snr"));
    }

    #[test]
    fn test_xdsl_record_empty() {
        let status: XdslStatus = serde_json::from_str("{}").unwrap();

        let mut sample = MetricSample::at(0);
        status.record(&mut sample);

        assert!(sample.is_empty());
    }
}
