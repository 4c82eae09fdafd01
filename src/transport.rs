// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! HTTP transport boundary.
//!
//! The iteration driver only depends on the [`Transport`] trait; production
//! code uses the [`HttpTransport`] implementation backed by `reqwest`, while
//! tests substitute in-memory fakes. One request is in flight at a time and
//! each call blocks the iteration until the full response is received.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::{config::TapConfig, error::Error, request::PreparedRequest};

/// Connect/read timeout applied to the underlying client.
const REQUEST_TIMEOUT_SECS: u64 = 30;

fn default_user_agent() -> String {
    format!("tap-fpl/{}", env!("CARGO_PKG_VERSION"))
}

/// Executes prepared requests and returns decoded JSON bodies.
///
/// Implementations do not retry; failures propagate unchanged to the caller
/// and terminate the enclosing stream iteration.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Dispatches one request and decodes the response body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] for construction, network, or non-2xx
    /// failures.
    async fn fetch(&self, request: &PreparedRequest) -> Result<Value, Error>;
}

/// Production transport backed by a `reqwest` client.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport configured from the tap configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] when the underlying client cannot be
    /// constructed.
    pub fn new(config: &TapConfig) -> Result<Self, Error> {
        let user_agent = config
            .user_agent
            .clone()
            .unwrap_or_else(default_user_agent);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, request: &PreparedRequest) -> Result<Value, Error> {
        let mut builder = self.client.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }

        debug!("GET {}", request.url);
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::transport(format!(
                "GET {} returned {status}",
                request.url
            )));
        }

        let body = response.json::<Value>().await?;
        Ok(body)
    }
}
