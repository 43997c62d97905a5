//! HTTP transport used by the client
//!
//! The client only needs "send these parameters, give me status and body".
//! `HttpTransport` does that over a blocking reqwest client.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::error::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
        })
    }
}

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one HTTP exchange.
///
/// GET parameters travel in the query string, POST parameters as an
/// `application/x-www-form-urlencoded` body. Non-2xx statuses are returned
/// as a normal `Response`; the client decides what counts as failure.
pub trait Transport {
    fn send(
        &self,
        method: Method,
        url: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<Response, TransportError>;
}

/// Blocking reqwest transport.
pub struct HttpTransport {
    http: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
        }
    }

    /// Transport whose requests fail with `TransportError::Connect` after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Connect {
                url: String::new(),
                source: Box::new(e),
            })?;
        Ok(Self { http })
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        method: Method,
        url: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<Response, TransportError> {
        let request = match method {
            Method::Get => self.http.get(url).query(params),
            Method::Post => self.http.post(url).form(params),
        };

        let connect_err = |e: reqwest::Error| TransportError::Connect {
            url: url.to_string(),
            source: Box::new(e),
        };

        let resp = request.send().map_err(connect_err)?;
        let status = resp.status().as_u16();
        let body = resp.text().map_err(connect_err)?;
        Ok(Response { status, body })
    }
}
