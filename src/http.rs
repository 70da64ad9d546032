//! HTTP transport for the remote move sources.

use std::time::Duration;
use crate::error::Result;

/// Blocking JSON GET. One attempt per call; callers treat any error as a
/// miss.
pub trait HttpClient: Send {
    fn get_json(&self, url: &str, params: &[(&str, String)], timeout: Duration) -> Result<serde_json::Value>;
}

#[cfg(feature = "http")]
pub use self::reqwest_client::ReqwestClient;

#[cfg(feature = "http")]
mod reqwest_client {
    use std::time::Duration;
    use crate::error::{ArbiterError, Result};
    use super::HttpClient;

    pub struct ReqwestClient {
        client: reqwest::blocking::Client,
    }

    impl ReqwestClient {
        pub fn new() -> Result<Self> {
            let client = reqwest::blocking::Client::builder()
                .user_agent(concat!("piebot-arbiter/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| ArbiterError::Http { url: String::new(), reason: e.to_string() })?;
            Ok(Self { client })
        }
    }

    impl HttpClient for ReqwestClient {
        fn get_json(&self, url: &str, params: &[(&str, String)], timeout: Duration) -> Result<serde_json::Value> {
            let http_err = |e: reqwest::Error| ArbiterError::Http { url: url.to_string(), reason: e.to_string() };
            let res = self.client.get(url).query(params).timeout(timeout).send().map_err(http_err)?;
            let res = res.error_for_status().map_err(http_err)?;
            res.json::<serde_json::Value>().map_err(http_err)
        }
    }
}
