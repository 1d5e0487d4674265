//! Domain records shared between the ingestion pipeline and the read API.

use serde::{Deserialize, Serialize};

/// Sentinel value for textual fields whose pattern did not match.
pub const UNKNOWN: &str = "unknown";

/// A structured firewall event extracted from one log line.
///
/// Field names mirror the `log_data` table columns. Missing textual fields
/// hold [`UNKNOWN`]; missing numeric fields hold `0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub timestamp: String,
    pub source_ip: String,
    pub destination_ip: String,
    pub protocol: String,
    pub source_port: i32,
    pub destination_port: i32,
    pub action: String,
    pub reason: String,
    pub packet_length: i32,
    pub ttl: i32,
}

impl LogEvent {
    /// True when the extractor could not find a destination address.
    ///
    /// Such events are counted as malformed and never offered to the store.
    pub fn is_malformed(&self) -> bool {
        self.destination_ip == UNKNOWN
    }
}

/// Geolocation data in the provider's response schema.
///
/// The serde renames match the ip-api.com JSON field names; the Rust field
/// names match the `ip_geo` table columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoData {
    #[serde(default)]
    pub country: String,
    #[serde(rename = "regionName", default)]
    pub region: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub isp: String,
    #[serde(rename = "lat", default)]
    pub latitude: Option<f64>,
    #[serde(rename = "lon", default)]
    pub longitude: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geo_data_deserializes_provider_schema() {
        let json = r#"{
            "country": "United States",
            "regionName": "CA",
            "city": "San Francisco",
            "isp": "MockISP",
            "lat": 37.7749,
            "lon": -122.4194
        }"#;
        let geo: GeoData = serde_json::from_str(json).unwrap();
        assert_eq!(geo.country, "United States");
        assert_eq!(geo.region, "CA");
        assert_eq!(geo.city, "San Francisco");
        assert_eq!(geo.isp, "MockISP");
        assert_eq!(geo.latitude, Some(37.7749));
        assert_eq!(geo.longitude, Some(-122.4194));
    }

    #[test]
    fn geo_data_tolerates_missing_fields() {
        let geo: GeoData = serde_json::from_str("{}").unwrap();
        assert_eq!(geo.country, "");
        assert_eq!(geo.latitude, None);
        assert_eq!(geo.longitude, None);
    }
}
