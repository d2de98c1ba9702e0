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

use crate::client::{ApiClient, Session};
use crate::error::FreeboxError;
use crate::telemetry::connection::{ConnectionStatus, FtthStatus, Media, XdslStatus};
use crate::telemetry::sample::{MetricSample, Record};
use crate::telemetry::storage::DiskStatus;
use crate::telemetry::switch::{NumberedPortStats, PortStats, SwitchStatus, SWITCH_PORTS};
use crate::telemetry::system::SystemStatus;
use serde::de::DeserializeOwned;
use tracing::Instrument;

/// Optional telemetry categories to fetch in addition to the connection status,
/// which is always fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Categories {
    pub switch_status: bool,
    pub switch_ports: bool,
    pub system: bool,
    pub disk: Option<u32>,
}

/// Fetch every enabled category, one request at a time, and flatten the
/// results into a single sample.
///
/// The first failed request aborts collection so that a run either emits a
/// complete sample or nothing at all.
#[derive(Debug)]
pub struct Collector<'a> {
    client: &'a ApiClient,
    session: &'a Session,
    categories: Categories,
}

impl<'a> Collector<'a> {
    pub fn new(client: &'a ApiClient, session: &'a Session, categories: Categories) -> Self {
        Collector {
            client,
            session,
            categories,
        }
    }

    pub async fn collect(&self) -> Result<MetricSample, FreeboxError> {
        let mut sample = MetricSample::new();

        let connection: ConnectionStatus = self.fetch("connection/", &mut sample).await?;
        match connection.media {
            Media::Ftth => {
                self.fetch::<FtthStatus>("connection/ftth/", &mut sample).await?;
            }
            Media::Xdsl => {
                self.fetch::<XdslStatus>("connection/xdsl/", &mut sample).await?;
            }
            Media::Other => {
                tracing::debug!(message = "no line statistics for connection media");
            }
        }

        if self.categories.system {
            self.fetch::<SystemStatus>("system/", &mut sample).await?;
        }

        if self.categories.switch_status {
            self.fetch::<SwitchStatus>("switch/status/", &mut sample).await?;
        }

        if self.categories.switch_ports {
            for id in SWITCH_PORTS {
                let stats: PortStats = self.get(&format!("switch/port/{}/stats/", id)).await?;
                NumberedPortStats { id, stats }.record(&mut sample);
            }
        }

        if let Some(id) = self.categories.disk {
            self.fetch::<DiskStatus>(&format!("storage/disk/{}", id), &mut sample).await?;
        }

        tracing::debug!(message = "collected telemetry", metrics = sample.len());
        Ok(sample)
    }

    async fn fetch<T>(&self, path: &str, sample: &mut MetricSample) -> Result<T, FreeboxError>
    where
        T: DeserializeOwned + Record,
    {
        let res: T = self.get(path).await?;
        res.record(sample);
        Ok(res)
    }

    async fn get<T>(&self, path: &str) -> Result<T, FreeboxError>
    where
        T: DeserializeOwned,
    {
        self.client
            .get(path, Some(self.session))
            .instrument(tracing::debug_span!("api_get", path = path))
            .await
    }
}

#[cfg(test)]
mod test {
    use super::{Categories, Collector};
    use crate::client::{ApiClient, ApiConfig, AppIdentity, Session};
    use crate::error::ErrorKind;
    use crate::telemetry::sample::MetricValue;
    use crate::test::{FakeApi, SESSION_TOKEN};

    #[tokio::test]
    async fn test_collect_ftth_connection_only() {
        let api = FakeApi::start().await;
        let client = ApiClient::new(ApiConfig::new(api.endpoint(), AppIdentity::default()));
        let session = Session::new(SESSION_TOKEN);

        let sample = Collector::new(&client, &session, Categories::default())
            .collect()
            .await
            .unwrap();

        assert_eq!(Some(&MetricValue::Integer(1000)), sample.get("bytes_down"));
        assert_eq!(Some(&MetricValue::Integer(-1234)), sample.get("sfp_pwr_rx"));
        assert!(!sample.contains("sys_fan_rpm"));
        assert!(!sample.contains("xdsl_status"));
        assert_eq!(2, api.hits());
    }

    #[tokio::test]
    async fn test_collect_xdsl_everything() {
        let api = FakeApi::builder().media("xdsl").start().await;
        let client = ApiClient::new(ApiConfig::new(api.endpoint(), AppIdentity::default()));
        let session = Session::new(SESSION_TOKEN);
        let categories = Categories {
            switch_status: true,
            switch_ports: true,
            system: true,
            disk: Some(0),
        };

        let sample = Collector::new(&client, &session, categories).collect().await.unwrap();

        assert_eq!(Some(&MetricValue::Integer(5)), sample.get("xdsl_status"));
        assert_eq!(Some(&MetricValue::Integer(65)), sample.get("xdsl_down_snr"));
        assert!(!sample.contains("sfp_pwr_rx"));
        assert_eq!(Some(&MetricValue::Integer(1)), sample.get("switch_1_link"));
        assert_eq!(Some(&MetricValue::Integer(0)), sample.get("switch_2_link"));
        assert_eq!(Some(&MetricValue::Integer(100)), sample.get("switch_4_rx_bytes_rate"));
        assert_eq!(Some(&MetricValue::Integer(1800)), sample.get("sys_fan_rpm"));
        assert_eq!(Some(&MetricValue::Integer(250)), sample.get("disk_used_bytes"));
        // connection, xdsl, system, switch status, four ports, disk
        assert_eq!(9, api.hits());
    }

    #[tokio::test]
    async fn test_collect_fails_fast() {
        let api = FakeApi::start().await;
        let client = ApiClient::new(ApiConfig::new(api.endpoint(), AppIdentity::default()));
        let session = Session::new(SESSION_TOKEN);
        let categories = Categories {
            disk: Some(7),
            ..Categories::default()
        };

        let err = Collector::new(&client, &session, categories)
            .collect()
            .await
            .unwrap_err();

        assert_eq!(ErrorKind::Response, err.kind());
    }

    #[tokio::test]
    async fn test_collect_bad_session() {
        let api = FakeApi::start().await;
        let client = ApiClient::new(ApiConfig::new(api.endpoint(), AppIdentity::default()));
        let session = Session::new("expired");

        let err = Collector::new(&client, &session, Categories::default())
            .collect()
            .await
            .unwrap_err();

        assert_eq!(ErrorKind::Response, err.kind());
        assert_eq!(1, api.hits());
    }
}
