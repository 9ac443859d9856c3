//! One-shot startup configuration fetch.
//!
//! The overlay server publishes a [`BootstrapConfig`] at `{server}/api/config`.
//! It is fetched once with a short timeout; a failure is not retried and the
//! HUD stays in `init failed`. Link URLs in the config may be relative to the
//! server base, so they are resolved here before the links see them.

use log::info;
use reqwest::Client;
use url::Url;

use crate::{
    config::{BOOTSTRAP_TIMEOUT, BootstrapConfig, CONFIG_PATH},
    error::HudError,
};

/// Link endpoints, resolved to absolute URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEndpoints {
    pub camera: Url,
    pub telemetry: Url,
}

/// Fetch and parse the bootstrap config.
pub async fn fetch_config(client: &Client, server: &Url) -> Result<BootstrapConfig, HudError> {
    let url = server.join(CONFIG_PATH)?;
    info!("bootstrap: fetching {url}");

    let response = client.get(url.clone()).timeout(BOOTSTRAP_TIMEOUT).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(HudError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await?;
    parse_config(&body)
}

pub fn parse_config(body: &[u8]) -> Result<BootstrapConfig, HudError> {
    Ok(serde_json::from_slice(body)?)
}

impl BootstrapConfig {
    /// Resolve `camera_url` and `telemetry_url` against the server base.
    /// Absolute URLs are kept as they are.
    pub fn endpoints(&self, server: &Url) -> Result<LinkEndpoints, HudError> {
        Ok(LinkEndpoints {
            camera: server.join(&self.camera_url)?,
            telemetry: server.join(&self.telemetry_url)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> Url {
        Url::parse("http://10.0.0.5:8080").unwrap()
    }

    fn config(camera_url: &str, telemetry_url: &str) -> BootstrapConfig {
        BootstrapConfig {
            source: "webcam".to_owned(),
            target_fps: 30,
            camera_url: camera_url.to_owned(),
            telemetry_url: telemetry_url.to_owned(),
        }
    }

    #[test]
    fn test_relative_urls_resolved_against_server() {
        let endpoints = config("/camera/live.mjpg", "/api/telemetry/stream").endpoints(&server()).unwrap();
        assert_eq!(endpoints.camera.as_str(), "http://10.0.0.5:8080/camera/live.mjpg");
        assert_eq!(endpoints.telemetry.as_str(), "http://10.0.0.5:8080/api/telemetry/stream");
    }

    #[test]
    fn test_absolute_urls_kept() {
        let endpoints = config("http://cam.local:9000/snap.jpg?q=1", "/events").endpoints(&server()).unwrap();
        assert_eq!(endpoints.camera.as_str(), "http://cam.local:9000/snap.jpg?q=1");
    }

    #[test]
    fn test_invalid_url_is_error() {
        let result = config("http://[::1", "/events").endpoints(&server());
        assert!(matches!(result, Err(HudError::Url(_))));
    }

    #[test]
    fn test_parse_config_errors() {
        assert!(matches!(parse_config(b"<html>"), Err(HudError::Payload(_))));
        assert!(parse_config(br#"{"camera_url": "/c", "telemetry_url": "/t"}"#).is_ok());
    }
}
