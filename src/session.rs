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
use std::fmt;

use reqwest::{header::LOCATION, Method, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::ServiceRoot;
use crate::network::{RedfishHttpClient, SERVICE_ROOT};
use crate::RedfishError;

pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";
const DEFAULT_SESSIONS: &str = "/redfish/v1/SessionService/Sessions";
const DEFAULT_SESSION_SERVICE: &str = "/redfish/v1/SessionService";

/// How requests authenticate against the BMC.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    /// Create a Redfish session and send its X-Auth-Token
    #[default]
    Session,
    /// Send HTTP basic credentials with every request
    Basic,
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::Session => f.write_str("session"),
            AuthMethod::Basic => f.write_str("basic"),
        }
    }
}

/// A live Redfish session. Deleting `location` ends it.
#[derive(Clone)]
pub struct Session {
    pub token: String,
    pub location: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("location", &self.location)
            .finish()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SessionCreate<'a> {
    user_name: &'a str,
    password: &'a str,
}

impl fmt::Debug for SessionCreate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{UserName: {}, Password: <redacted>}}", self.user_name)
    }
}

#[derive(Debug, Deserialize)]
struct SessionBody {
    #[serde(rename = "@odata.id")]
    odata_id: Option<String>,
}

fn is_auth_rejection(status_code: StatusCode) -> bool {
    status_code == StatusCode::UNAUTHORIZED || status_code == StatusCode::FORBIDDEN
}

// 401/403 while logging in means bad credentials, whatever else the BMC said.
fn classify_login_error(e: RedfishError) -> RedfishError {
    match e {
        RedfishError::HTTPErrorCode {
            url, status_code, ..
        } if is_auth_rejection(status_code) => {
            RedfishError::AuthenticationFailed { url, status_code }
        }
        e => e,
    }
}

impl RedfishHttpClient {
    /// Authenticate with the endpoint's credentials. For session auth this creates a session
    /// through the link advertised by the service root. For basic auth the credentials are
    /// checked with one authenticated GET.
    pub fn login(&mut self) -> Result<(), RedfishError> {
        let (_status_code, root): (_, ServiceRoot) = self.get(SERVICE_ROOT)?;
        debug!(
            "BMC vendor {:?}, product {:?}, Redfish {:?}",
            root.vendor_string(),
            root.product,
            root.redfish_version
        );
        if !root.is_lenovo() {
            warn!(
                "BMC at {} does not report itself as Lenovo; the reset action may not exist",
                self.endpoint.host
            );
        }
        match self.endpoint.auth {
            AuthMethod::Session => self.create_session(&root),
            AuthMethod::Basic => self.check_basic(&root),
        }
    }

    fn create_session(&mut self, root: &ServiceRoot) -> Result<(), RedfishError> {
        let sessions = root.sessions_link().unwrap_or(DEFAULT_SESSIONS).to_string();
        let body = SessionCreate {
            user_name: self.endpoint.user.as_deref().unwrap_or_default(),
            password: self.endpoint.password.as_deref().unwrap_or_default(),
        };
        let resp = self
            .req_with_headers::<SessionBody, _>(Method::POST, &sessions, Some(body))
            .map_err(classify_login_error)?;

        let token = resp
            .headers
            .get(AUTH_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| RedfishError::MissingHeader {
                header: AUTH_TOKEN_HEADER.to_string(),
                url: sessions.clone(),
            })?
            .to_string();
        let location = resp
            .headers
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or_else(|| resp.body.and_then(|b| b.odata_id))
            .ok_or_else(|| RedfishError::MissingHeader {
                header: LOCATION.to_string(),
                url: sessions.clone(),
            })?;
        debug!("Session created at {location}");
        self.session = Some(Session { token, location });
        Ok(())
    }

    fn check_basic(&self, root: &ServiceRoot) -> Result<(), RedfishError> {
        let service = root
            .session_service
            .as_ref()
            .map(|s| s.odata_id.as_str())
            .unwrap_or(DEFAULT_SESSION_SERVICE);
        self.get::<serde_json::Value>(service)
            .map_err(classify_login_error)?;
        Ok(())
    }

    /// End the session, if there is one. The session is forgotten even when the DELETE fails,
    /// so logout never runs twice.
    pub fn logout(&mut self) -> Result<(), RedfishError> {
        let Some(session) = self.session.as_ref() else {
            return Ok(());
        };
        let location = session.location.clone();
        let result = self.delete(&location);
        self.session = None;
        result.map(|_status_code| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_401_is_authentication_failure() {
        let e = classify_login_error(RedfishError::HTTPErrorCode {
            url: DEFAULT_SESSIONS.to_string(),
            status_code: StatusCode::UNAUTHORIZED,
            extended: String::new(),
        });
        assert!(matches!(e, RedfishError::AuthenticationFailed { .. }));
    }

    #[test]
    fn test_login_500_stays_http_error() {
        let e = classify_login_error(RedfishError::HTTPErrorCode {
            url: DEFAULT_SESSIONS.to_string(),
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            extended: String::new(),
        });
        assert!(matches!(e, RedfishError::HTTPErrorCode { .. }));
    }

    #[test]
    fn test_secrets_not_in_debug() {
        let body = SessionCreate {
            user_name: "USERID",
            password: "PASSW0RD",
        };
        let dbg = format!("{body:?}");
        assert!(dbg.contains("USERID"));
        assert!(!dbg.contains("PASSW0RD"));

        let session = Session {
            token: "abcdef".to_string(),
            location: "/redfish/v1/SessionService/Sessions/1".to_string(),
        };
        assert!(!format!("{session:?}").contains("abcdef"));
    }

    #[test]
    fn test_session_create_body() {
        let body = SessionCreate {
            user_name: "USERID",
            password: "PASSW0RD",
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"UserName":"USERID","Password":"PASSW0RD"}"#
        );
    }
}
