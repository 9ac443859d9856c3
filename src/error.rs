//! Error type shared by the links, bootstrap and the render loop.
//!
//! None of these are fatal to the render loop: links turn them into state
//! transitions, only bootstrap failures stop startup.

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum HudError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("malformed telemetry payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("camera frame decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("camera stream ended without a frame")]
    EmptyStream,

    #[error("no data for {0:?}")]
    Stalled(Duration),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
