/*
 * SPDX-FileCopyrightText: Copyright (c) 2023 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: MIT
 *
 * Permission is hereby granted, free of charge, to any person obtaining a
 * copy of this software and associated documentation files (the "Software"),
 * to deal in the Software without restriction, including without limitation
 * the rights to use, copy, modify, merge, publish, distribute, sublicense,
 * and/or sell copies of the Software, and to permit persons to whom the
 * Software is furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in
 * all copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL
 * THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
 * FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
 * DEALINGS IN THE SOFTWARE.
 */
use std::{fmt, time::Duration};

use reqwest::{
    blocking::Client as HttpClient, blocking::ClientBuilder as HttpClientBuilder,
    header::HeaderMap, header::HeaderValue, header::ACCEPT, header::CONTENT_TYPE, Method,
    StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::model::error::extended_error;
pub use crate::RedfishError;
use crate::session::{AuthMethod, Session};

pub const REDFISH_ENDPOINT: &str = "redfish/v1";
pub const SERVICE_ROOT: &str = "/redfish/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug)]
pub struct RedfishClientPoolBuilder {
    timeout: Duration,
    accept_invalid_certs: bool,
}

impl RedfishClientPoolBuilder {
    /// Prevents the Redfish Client from accepting self signed certificates
    /// and other invalid certificates.
    ///
    /// By default self signed certificates will be accepted, since BMCs usually
    /// use those.
    pub fn reject_invalid_certs(mut self) -> RedfishClientPoolBuilder {
        self.accept_invalid_certs = false;
        self
    }

    /// Overwrites the timeout that will be applied to every request
    pub fn timeout(mut self, timeout: Duration) -> RedfishClientPoolBuilder {
        self.timeout = timeout;
        self
    }

    pub fn build(&self) -> Result<RedfishClientPool, RedfishError> {
        let http_client = HttpClientBuilder::new()
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .timeout(self.timeout)
            .build()
            .map_err(RedfishError::ClientBuildError)?;
        Ok(RedfishClientPool { http_client })
    }
}

#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    #[default]
    Https,
    Http,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Https => f.write_str("https"),
            Scheme::Http => f.write_str("http"),
        }
    }
}

/// The endpoint that the redfish client connects to
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Endpoint {
    /// Hostname or IP address of BMC
    pub host: String,
    /// BMC port. If absent the scheme's default port is used
    pub port: Option<u16>,
    /// BMC username
    pub user: Option<String>,
    /// BMC password
    pub password: Option<String>,
    pub scheme: Scheme,
    pub auth: AuthMethod,
}

impl Endpoint {
    /// scheme://host[:port], no trailing slash.
    pub fn origin(&self) -> String {
        match self.port {
            Some(p) => format!("{}://{}:{}", self.scheme, self.host, p),
            None => format!("{}://{}", self.scheme, self.host),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RedfishClientPool {
    http_client: HttpClient,
}

impl RedfishClientPool {
    /// Returns Builder for configuring a Redfish HTTP connection pool
    pub fn builder() -> RedfishClientPoolBuilder {
        RedfishClientPoolBuilder {
            timeout: DEFAULT_TIMEOUT,
            // BMCs often have a self-signed cert, so usually this has to be true
            accept_invalid_certs: true,
        }
    }

    /// Creates a client for one BMC. No request is made until login.
    pub fn create_client(&self, endpoint: Endpoint) -> RedfishHttpClient {
        RedfishHttpClient::new(self.http_client.clone(), endpoint)
    }
}

/// What came back from one request.
#[derive(Debug)]
pub struct RedfishResponse<T> {
    pub status_code: StatusCode,
    pub headers: HeaderMap,
    pub body: Option<T>,
}

/// A HTTP client which targets a single BMC
pub struct RedfishHttpClient {
    pub(crate) endpoint: Endpoint,
    http_client: HttpClient,
    pub(crate) session: Option<Session>,
}

impl RedfishHttpClient {
    pub fn new(http_client: HttpClient, endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            http_client,
            session: None,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Resolves a link from a response into a full URL. Links are normally absolute paths
    /// ("/redfish/v1/Managers"); anything else is taken relative to the Redfish root.
    pub fn url_for(&self, api: &str) -> String {
        if api.starts_with("http://") || api.starts_with("https://") {
            api.to_string()
        } else if api.starts_with('/') {
            format!("{}{}", self.endpoint.origin(), api)
        } else {
            format!("{}/{}/{}", self.endpoint.origin(), REDFISH_ENDPOINT, api)
        }
    }

    pub fn get<T>(&self, api: &str) -> Result<(StatusCode, T), RedfishError>
    where
        T: DeserializeOwned + ::std::fmt::Debug,
    {
        let resp = self.req_with_headers::<T, String>(Method::GET, api, None)?;
        match resp.body {
            Some(response_body) => Ok((resp.status_code, response_body)),
            None => Err(RedfishError::NoContent {
                url: api.to_string(),
                status_code: resp.status_code,
            }),
        }
    }

    /// POST an action. BMCs answer actions with 200 and some body, or 204 and none. Only the
    /// status matters; the body is not decoded.
    pub fn post<B>(&self, api: &str, data: B) -> Result<StatusCode, RedfishError>
    where
        B: Serialize + ::std::fmt::Debug,
    {
        let resp = self.send(Method::POST, api, Some(data))?;
        Ok(resp.status_code)
    }

    pub fn delete(&self, api: &str) -> Result<StatusCode, RedfishError> {
        let resp = self.send::<String>(Method::DELETE, api, None)?;
        Ok(resp.status_code)
    }

    /// Send a request and decode a non-empty 2XX body as JSON.
    pub fn req_with_headers<T, B>(
        &self,
        method: Method,
        api: &str,
        body: Option<B>,
    ) -> Result<RedfishResponse<T>, RedfishError>
    where
        T: DeserializeOwned + ::std::fmt::Debug,
        B: Serialize + ::std::fmt::Debug,
    {
        let raw = self.send(method, api, body)?;
        let text = raw.body.unwrap_or_default();
        let mut res = None;
        if !text.is_empty() {
            match serde_json::from_str(&text) {
                Ok(v) => res.insert(v),
                Err(e) => {
                    return Err(RedfishError::JsonDeserializeError {
                        url: self.url_for(api),
                        status_code: raw.status_code,
                        body: text,
                        source: e,
                    });
                }
            };
        }
        Ok(RedfishResponse {
            status_code: raw.status_code,
            headers: raw.headers,
            body: res,
        })
    }

    // All the HTTP requests happen from here. Non-2XX statuses become HTTPErrorCode; the
    // body of a 2XX answer is handed back as text.
    fn send<B>(
        &self,
        method: Method,
        api: &str,
        body: Option<B>,
    ) -> Result<RedfishResponse<String>, RedfishError>
    where
        B: Serialize + ::std::fmt::Debug,
    {
        let url = self.url_for(api);
        // Bodies are logged through Debug, so a type carrying a secret can hide it.
        let (body_enc, body_debug) = match body {
            Some(b) => {
                let body_debug = format!("{b:?}");
                let body_enc =
                    serde_json::to_string(&b).map_err(|e| RedfishError::JsonSerializeError {
                        url: url.clone(),
                        object_debug: body_debug.clone(),
                        source: e,
                    })?;
                (Some(body_enc), body_debug)
            }
            None => (None, String::new()),
        };
        debug!("TX {} {} {}", method, url, body_debug);

        let mut req_b = match method {
            Method::GET => self.http_client.get(&url),
            Method::POST => self.http_client.post(&url),
            Method::DELETE => self.http_client.delete(&url),
            _ => unreachable!("Only GET, POST and DELETE http methods are used."),
        };
        req_b = req_b
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        req_b = self.authorize(req_b);
        if let Some(b) = body_enc {
            req_b = req_b.body(b);
        }
        let response = req_b.send().map_err(|e| RedfishError::NetworkError {
            url: url.clone(),
            source: e,
        })?;
        let status_code = response.status();
        let headers = response.headers().clone();
        // read the body even if not status 2XX, because BMCs give useful error messages as JSON
        let response_body = response.text().map_err(|e| RedfishError::NetworkError {
            url: url.clone(),
            source: e,
        })?;
        if response_body.is_empty() {
            debug!("RX {status_code}");
        } else {
            debug!("RX {status_code} {response_body}");
        }

        if !status_code.is_success() {
            return Err(RedfishError::HTTPErrorCode {
                url: api.to_string(),
                status_code,
                extended: extended_error(&response_body),
            });
        }
        Ok(RedfishResponse {
            status_code,
            headers,
            body: Some(response_body),
        })
    }

    fn authorize(
        &self,
        req_b: reqwest::blocking::RequestBuilder,
    ) -> reqwest::blocking::RequestBuilder {
        if let Some(session) = &self.session {
            return req_b.header(crate::session::AUTH_TOKEN_HEADER, session.token.as_str());
        }
        match (&self.endpoint.auth, &self.endpoint.user) {
            (AuthMethod::Basic, Some(user)) => {
                req_b.basic_auth(user, self.endpoint.password.as_ref())
            }
            _ => req_b,
        }
    }
}
