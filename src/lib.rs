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
//! Reset a Lenovo XClarity Controller's configuration to factory defaults over Redfish.
//!
//! ```no_run
//! use bmc_config_default::{set_bmc_config_default, Endpoint, RedfishClientPool};
//!
//! let pool = RedfishClientPool::builder().build().unwrap();
//! let result = set_bmc_config_default(
//!     &pool,
//!     Endpoint {
//!         host: "10.0.0.7".to_string(),
//!         user: Some("USERID".to_string()),
//!         password: Some("PASSW0RD".to_string()),
//!         ..Default::default()
//!     },
//! );
//! println!("{}", result.message);
//! ```
use std::fmt;

use tracing::{info, warn};

mod error;
mod jsonmap;
pub mod lenovo;
pub mod model;
mod network;
mod session;

pub use error::RedfishError;
pub use network::{
    Endpoint, RedfishClientPool, RedfishClientPoolBuilder, RedfishHttpClient, RedfishResponse,
    Scheme, REDFISH_ENDPOINT, SERVICE_ROOT,
};
pub use session::{AuthMethod, Session};

/// Reported for every login problem. The cause goes to the log, not to the caller.
pub const LOGIN_FAILED_MESSAGE: &str = "Please check if the username, password, IP are correct";
pub const RESET_SUCCEEDED_MESSAGE: &str = "Reset bmc configuration default successfully";

/// Outcome of one reset attempt. Exactly one is produced per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetResult {
    pub success: bool,
    pub message: String,
}

impl ResetResult {
    fn succeeded(message: impl Into<String>) -> Self {
        ResetResult {
            success: true,
            message: message.into(),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        ResetResult {
            success: false,
            message: message.into(),
        }
    }
}

impl fmt::Display for ResetResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Log in to the BMC at `endpoint`, reset its configuration to factory defaults, log out.
///
/// A failed login ends the call straight away with [`LOGIN_FAILED_MESSAGE`]. After a
/// successful login the session is closed exactly once, whatever the outcome of the reset.
pub fn set_bmc_config_default(pool: &RedfishClientPool, endpoint: Endpoint) -> ResetResult {
    let mut client = pool.create_client(endpoint);
    if let Err(e) = client.login() {
        if e.is_login_failure() {
            warn!("Login to {} failed: {e}", client.endpoint().host);
        } else {
            warn!(
                "Login to {} failed with an unexpected response: {e}",
                client.endpoint().host
            );
        }
        return ResetResult::failed(LOGIN_FAILED_MESSAGE);
    }

    let outcome = lenovo::Bmc::new(&client).reset_config_to_default();

    if let Err(e) = client.logout() {
        warn!("Logout from {} failed: {e}", client.endpoint().host);
    }

    match outcome {
        Ok(target) => {
            info!("{} accepted {target}", client.endpoint().host);
            ResetResult::succeeded(RESET_SUCCEEDED_MESSAGE)
        }
        Err(e) => ResetResult::failed(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_host_reports_credentials_hint() {
        // Nothing listens on port 9 of the loopback address.
        let pool = RedfishClientPool::builder()
            .timeout(std::time::Duration::from_secs(2))
            .build()
            .unwrap();
        let result = set_bmc_config_default(
            &pool,
            Endpoint {
                host: "127.0.0.1".to_string(),
                port: Some(9),
                user: Some("USERID".to_string()),
                password: Some("PASSW0RD".to_string()),
                scheme: Scheme::Http,
                ..Default::default()
            },
        );
        assert!(!result.success);
        assert_eq!(result.message, LOGIN_FAILED_MESSAGE);
    }

    #[test]
    fn test_result_display_is_message() {
        let r = ResetResult::succeeded(RESET_SUCCEEDED_MESSAGE);
        assert_eq!(r.to_string(), RESET_SUCCEEDED_MESSAGE);
        assert!(r.success);
    }
}
