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
use reqwest::StatusCode;

#[derive(thiserror::Error, Debug)]
pub enum RedfishError {
    #[error("Could not build HTTP client. {0}")]
    ClientBuildError(reqwest::Error),

    #[error("Network error talking to BMC at {url}. {source}")]
    NetworkError { url: String, source: reqwest::Error },

    #[error("Url '{url}' response Error code {}\nerror_message: {extended}", .status_code.as_u16())]
    HTTPErrorCode {
        url: String,
        status_code: StatusCode,
        extended: String,
    },

    #[error("BMC at {url} rejected the credentials (HTTP {})", .status_code.as_u16())]
    AuthenticationFailed {
        url: String,
        status_code: StatusCode,
    },

    #[error("Response from {url} is missing the {header} header")]
    MissingHeader { header: String, url: String },

    #[error("Could not deserialize response from {url}. Body: {body}. {source}")]
    JsonDeserializeError {
        url: String,
        status_code: StatusCode,
        body: String,
        source: serde_json::Error,
    },

    #[error("Could not serialize request body for {url}. Obj: {object_debug}. {source}")]
    JsonSerializeError {
        url: String,
        object_debug: String,
        source: serde_json::Error,
    },

    #[error("Remote returned empty body at {url}")]
    NoContent { url: String, status_code: StatusCode },

    #[error("Missing key {key} in JSON at {url}")]
    MissingKey { key: String, url: String },

    #[error("Key {key} should be {expected_type} at {url}")]
    InvalidKeyType {
        key: String,
        expected_type: String,
        url: String,
    },

    #[error("Url '{url}' response Error code {}\nerror_message: {source}", .status_code.as_u16())]
    MalformedResponse {
        url: String,
        status_code: StatusCode,
        source: Box<RedfishError>,
    },

    #[error("No manager under {url} exposes a Lenovo configuration resource")]
    NoEligibleManager { url: String },
}

impl RedfishError {
    /// True for the failures that mean we never got a usable session: the BMC could not be
    /// reached, or it turned the credentials down.
    pub fn is_login_failure(&self) -> bool {
        matches!(
            self,
            RedfishError::NetworkError { .. }
                | RedfishError::AuthenticationFailed { .. }
                | RedfishError::MissingHeader { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_message_carries_url_status_and_detail() {
        let err = RedfishError::HTTPErrorCode {
            url: "/redfish/v1/Managers".to_string(),
            status_code: StatusCode::NOT_FOUND,
            extended: "The resource was not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Url '/redfish/v1/Managers' response Error code 404\nerror_message: The resource was not found"
        );
    }

    #[test]
    fn test_malformed_response_names_the_key() {
        let err = RedfishError::MalformedResponse {
            url: "/redfish/v1".to_string(),
            status_code: StatusCode::OK,
            source: Box::new(RedfishError::MissingKey {
                key: "Managers".to_string(),
                url: "/redfish/v1".to_string(),
            }),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Url '/redfish/v1' response Error code 200"));
        assert!(msg.contains("Missing key Managers"));
    }

    #[test]
    fn test_empty_body_is_reported_with_its_status() {
        let err = RedfishError::MalformedResponse {
            url: "/redfish/v1/Managers/1".to_string(),
            status_code: StatusCode::OK,
            source: Box::new(RedfishError::NoContent {
                url: "/redfish/v1/Managers/1".to_string(),
                status_code: StatusCode::OK,
            }),
        };
        assert_eq!(
            err.to_string(),
            "Url '/redfish/v1/Managers/1' response Error code 200\nerror_message: Remote returned empty body at /redfish/v1/Managers/1"
        );
    }

    #[test]
    fn test_login_failure_classification() {
        let auth = RedfishError::AuthenticationFailed {
            url: "/redfish/v1/SessionService/Sessions".to_string(),
            status_code: StatusCode::UNAUTHORIZED,
        };
        assert!(auth.is_login_failure());
        let missing = RedfishError::NoEligibleManager {
            url: "/redfish/v1/Managers".to_string(),
        };
        assert!(!missing.is_login_failure());
    }
}
