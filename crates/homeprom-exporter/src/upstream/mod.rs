//! Upstream clients.
//!
//! Each client performs exactly one HTTP request per [`Upstream::fetch`] and
//! decodes the body into a typed reading. All clients share one
//! `reqwest::Client` whose timeout bounds every call.

pub mod hue;
pub mod quote;
pub mod weather;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use homeprom_core::error::{HomepromError, Result};

pub use hue::HueClient;
pub use quote::QuoteClient;
pub use weather::{WeatherClient, WeatherReading};

/// One external data source.
#[async_trait]
pub trait Upstream: Send + Sync + 'static {
    type Reading: Send + Sync + 'static;

    /// Stable source name, used in logs and metric labels.
    fn name(&self) -> &'static str;

    async fn fetch(&self) -> Result<Self::Reading>;
}

pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("homeprom/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| HomepromError::Internal(format!("http client build failed: {e}")))
}

/// Send a request and return the body of a 2xx response.
pub(crate) async fn get_body(source_name: &'static str, req: reqwest::RequestBuilder) -> Result<Bytes> {
    let resp = req.send().await.map_err(|e| transport_error(source_name, e))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(HomepromError::Status {
            source_name,
            status: status.as_u16(),
        });
    }
    resp.bytes().await.map_err(|e| transport_error(source_name, e))
}

/// The request url is stripped: Hue urls carry the API key.
fn transport_error(source_name: &'static str, e: reqwest::Error) -> HomepromError {
    let e = e.without_url();
    if e.is_timeout() {
        HomepromError::Timeout { source_name }
    } else {
        HomepromError::Network {
            source_name,
            msg: e.to_string(),
        }
    }
}
