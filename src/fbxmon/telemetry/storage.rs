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

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Partition {
    pub total_bytes: Option<u64>,
    pub used_bytes: Option<u64>,
    pub free_bytes: Option<u64>,
}

/// Result of `storage/disk/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DiskStatus {
    pub temp: Option<i64>,
    #[serde(default)]
    pub partitions: Vec<Partition>,
}

impl Record for DiskStatus {
    fn record(&self, sample: &mut MetricSample) {
        // Usage is reported per partition, export the totals for the disk. A
        // total is only exported when every partition reports the field.
        if !self.partitions.is_empty() {
            let sum = |f: fn(&Partition) -> Option<u64>| self.partitions.iter().map(f).sum::<Option<u64>>();

            sample.insert_opt("disk_total_bytes", sum(|p| p.total_bytes));
            sample.insert_opt("disk_used_bytes", sum(|p| p.used_bytes));
            sample.insert_opt("disk_free_bytes", sum(|p| p.free_bytes));
        }

        sample.insert_opt("disk_temp", self.temp);
    }
}

#[cfg(test)]
mod test {
    use super::DiskStatus;
    use crate::telemetry::sample::{MetricSample, MetricValue, Record};

    #[test]
    fn test_disk_record_sums_partitions() {
        let status: DiskStatus = serde_json::from_str(
            r#"{"id": 0, "type": "internal", "state": "enabled", "temp": 37,
                "partitions": [
                    {"id": 1, "label": "Disque dur", "total_bytes": 1000, "used_bytes": 400, "free_bytes": 600},
                    {"id": 2, "label": "Swap", "total_bytes": 100, "used_bytes": 100, "free_bytes": 0}
                ]}"#,
        )
        .unwrap();

        let mut sample = MetricSample::at(0);
        status.record(&mut sample);

        assert_eq!(Some(&MetricValue::Integer(1100)), sample.get("disk_total_bytes"));
        assert_eq!(Some(&MetricValue::Integer(500)), sample.get("disk_used_bytes"));
        assert_eq!(Some(&MetricValue::Integer(600)), sample.get("disk_free_bytes"));
        assert_eq!(Some(&MetricValue::Integer(37)), sample.get("disk_temp"));
    }

    #[test]
    fn test_disk_record_partial_partitions() {
        let status: DiskStatus = serde_json::from_str(
            r#"{"partitions": [
                    {"total_bytes": 1000, "used_bytes": 400},
                    {"total_bytes": 100, "used_bytes": 100, "free_bytes": 0}
                ]}"#,
        )
        .unwrap();

        let mut sample = MetricSample::at(0);
        status.record(&mut sample);

        assert_eq!(Some(&MetricValue::Integer(1100)), sample.get("disk_total_bytes"));
        assert_eq!(Some(&MetricValue::Integer(500)), sample.get("disk_used_bytes"));
        assert!(!sample.contains("disk_free_bytes"));
        assert!(!sample.contains("disk_temp"));
    }

    #[test]
    fn test_disk_record_no_partitions() {
        let status: DiskStatus = serde_json::from_str(r#"{"id": 0, "state": "disabled"}"#).unwrap();

        let mut sample = MetricSample::at(0);
        status.record(&mut sample);

        assert!(sample.is_empty());
    }
}
