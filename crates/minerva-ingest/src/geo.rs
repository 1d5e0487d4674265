//! Geolocation enrichment client.
//!
//! One lookup is one GET to `{base_url}/{ip}` against an ip-api.com-style
//! provider. The [`GeoProvider`] trait lets the pipeline swap in a test
//! double; [`GeoClient`] is the production implementation with a shared,
//! connection-reusing HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use minerva_core::GeoData;

use crate::error::{Error, Result};

/// Default geolocation API base URL.
pub const DEFAULT_BASE_URL: &str = "http://ip-api.com/json";

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A source of geolocation data for a single IP.
#[async_trait]
pub trait GeoProvider: Send + Sync {
    /// Fetch geolocation data for `ip`.
    ///
    /// Any transport error, non-200 status, or decode failure is an error;
    /// partial success is not attempted.
    async fn fetch_geo(&self, ip: &str) -> Result<GeoData>;
}

/// HTTP client for the geolocation provider.
pub struct GeoClient {
    client: reqwest::Client,
    base_url: String,
}

impl GeoClient {
    /// Build a client for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl GeoProvider for GeoClient {
    async fn fetch_geo(&self, ip: &str) -> Result<GeoData> {
        let url = format!("{}/{}", self.base_url, ip);
        let response = self.client.get(&url).send().await?;

        if response.status() != StatusCode::OK {
            return Err(Error::GeoStatus(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::get;

    use super::*;

    /// Serve `router` on an ephemeral port, returning its base URL.
    async fn spawn_provider(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn fetch_geo_maps_provider_fields() {
        let base = spawn_provider(Router::new().route(
            "/{ip}",
            get(|Path(ip): Path<String>| async move {
                assert_eq!(ip, "192.0.2.1");
                r#"{
                    "country": "United States",
                    "regionName": "CA",
                    "city": "San Francisco",
                    "isp": "MockISP",
                    "lat": 37.7749,
                    "lon": -122.4194
                }"#
            }),
        ))
        .await;

        let client = GeoClient::new(&base).unwrap();
        let geo = client.fetch_geo("192.0.2.1").await.unwrap();
        assert_eq!(geo.country, "United States");
        assert_eq!(geo.region, "CA");
        assert_eq!(geo.city, "San Francisco");
        assert_eq!(geo.isp, "MockISP");
        assert_eq!(geo.latitude, Some(37.7749));
        assert_eq!(geo.longitude, Some(-122.4194));
    }

    #[tokio::test]
    async fn fetch_geo_rejects_server_error() {
        let base = spawn_provider(Router::new().route(
            "/{ip}",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        ))
        .await;

        let client = GeoClient::new(&base).unwrap();
        let err = client.fetch_geo("192.0.2.1").await.unwrap_err();
        assert!(matches!(err, Error::GeoStatus(500)));
    }

    #[tokio::test]
    async fn fetch_geo_rejects_malformed_json() {
        let base = spawn_provider(
            Router::new().route("/{ip}", get(|| async { r#"{"country":"# })),
        )
        .await;

        let client = GeoClient::new(&base).unwrap();
        let err = client.fetch_geo("192.0.2.1").await.unwrap_err();
        assert!(matches!(err, Error::Geo(_)));
    }

    #[tokio::test]
    async fn base_url_trailing_slash_is_stripped() {
        let base = spawn_provider(Router::new().route(
            "/{ip}",
            get(|Path(ip): Path<String>| async move {
                assert_eq!(ip, "203.0.113.5");
                "{}"
            }),
        ))
        .await;

        let client = GeoClient::new(format!("{base}/")).unwrap();
        let geo = client.fetch_geo("203.0.113.5").await.unwrap();
        assert_eq!(geo.country, "");
    }
}
