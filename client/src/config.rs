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
//! Connection settings from a TOML file, overridden by command line flags.
//!
//! ```toml
//! [connect]
//! bmc_ip = "10.0.0.7"
//! bmc_username = "USERID"
//! bmc_user_password = "PASSW0RD"
//! # optional
//! port = 443
//! auth = "session"          # or "basic"
//! scheme = "https"          # or "http"
//! timeout_secs = 20
//! accept_invalid_certs = true
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use bmc_config_default::{AuthMethod, Endpoint, RedfishClientPool, Scheme};
use serde::Deserialize;

/// Read when no --config is given and the file exists in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Default, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub connect: ConnectConfig,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectConfig {
    pub bmc_ip: Option<String>,
    pub bmc_username: Option<String>,
    pub bmc_user_password: Option<String>,
    pub port: Option<u16>,
    pub auth: Option<AuthMethod>,
    pub scheme: Option<Scheme>,
    pub timeout_secs: Option<u64>,
    pub accept_invalid_certs: Option<bool>,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Config> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }

    /// An explicit path must exist. Without one, DEFAULT_CONFIG_FILE is used if present.
    pub fn load_or_default(explicit: Option<&Path>) -> anyhow::Result<Config> {
        if let Some(path) = explicit {
            return Config::load(path);
        }
        let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
        if default_path.is_file() {
            return Config::load(&default_path);
        }
        Ok(Config::default())
    }
}

impl ConnectConfig {
    /// Values set in `overrides` win.
    pub fn merge(self, overrides: ConnectConfig) -> ConnectConfig {
        ConnectConfig {
            bmc_ip: overrides.bmc_ip.or(self.bmc_ip),
            bmc_username: overrides.bmc_username.or(self.bmc_username),
            bmc_user_password: overrides.bmc_user_password.or(self.bmc_user_password),
            port: overrides.port.or(self.port),
            auth: overrides.auth.or(self.auth),
            scheme: overrides.scheme.or(self.scheme),
            timeout_secs: overrides.timeout_secs.or(self.timeout_secs),
            accept_invalid_certs: overrides.accept_invalid_certs.or(self.accept_invalid_certs),
        }
    }

    pub fn endpoint(&self) -> anyhow::Result<Endpoint> {
        let mut missing = Vec::new();
        if self.bmc_ip.is_none() {
            missing.push("ip");
        }
        if self.bmc_username.is_none() {
            missing.push("user");
        }
        if self.bmc_user_password.is_none() {
            missing.push("passwd");
        }
        if !missing.is_empty() {
            bail!(
                "Missing parameters: {}. Set them in the config file or on the command line",
                missing.join(", ")
            );
        }
        Ok(Endpoint {
            host: self.bmc_ip.clone().unwrap_or_default(),
            port: self.port,
            user: self.bmc_username.clone(),
            password: self.bmc_user_password.clone(),
            scheme: self.scheme.unwrap_or_default(),
            auth: self.auth.unwrap_or_default(),
        })
    }

    pub fn client_pool(&self) -> anyhow::Result<RedfishClientPool> {
        let mut builder = RedfishClientPool::builder();
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if self.accept_invalid_certs == Some(false) {
            builder = builder.reject_invalid_certs();
        }
        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const FULL: &str = r#"
[connect]
bmc_ip = "10.0.0.7"
bmc_username = "USERID"
bmc_user_password = "PASSW0RD"
port = 8443
auth = "basic"
scheme = "https"
timeout_secs = 5
accept_invalid_certs = false
"#;

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(FULL).unwrap();
        let c = config.connect;
        assert_eq!(c.bmc_ip.as_deref(), Some("10.0.0.7"));
        assert_eq!(c.port, Some(8443));
        assert_eq!(c.auth, Some(AuthMethod::Basic));
        assert_eq!(c.accept_invalid_certs, Some(false));

        let endpoint = c.endpoint().unwrap();
        assert_eq!(endpoint.host, "10.0.0.7");
        assert_eq!(endpoint.auth, AuthMethod::Basic);
        assert_eq!(endpoint.origin(), "https://10.0.0.7:8443");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result: Result<Config, _> = toml::from_str("[connect]\nbmc_addr = \"x\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_command_line_wins() {
        let file: Config = toml::from_str(FULL).unwrap();
        let merged = file.connect.merge(ConnectConfig {
            bmc_ip: Some("10.0.0.8".to_string()),
            auth: Some(AuthMethod::Session),
            ..Default::default()
        });
        assert_eq!(merged.bmc_ip.as_deref(), Some("10.0.0.8"));
        assert_eq!(merged.bmc_username.as_deref(), Some("USERID"));
        assert_eq!(merged.auth, Some(AuthMethod::Session));
        assert_eq!(merged.port, Some(8443));
    }

    #[test]
    fn test_missing_parameters_listed() {
        let c = ConnectConfig {
            bmc_ip: Some("10.0.0.7".to_string()),
            ..Default::default()
        };
        let err = c.endpoint().unwrap_err().to_string();
        assert!(err.contains("user, passwd"), "{err}");
    }

    #[test]
    fn test_defaults_when_unset() {
        let c = ConnectConfig {
            bmc_ip: Some("10.0.0.7".to_string()),
            bmc_username: Some("USERID".to_string()),
            bmc_user_password: Some("PASSW0RD".to_string()),
            ..Default::default()
        };
        let endpoint = c.endpoint().unwrap();
        assert_eq!(endpoint.scheme, Scheme::Https);
        assert_eq!(endpoint.auth, AuthMethod::Session);
        assert_eq!(endpoint.port, None);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();
        let config = Config::load_or_default(Some(file.path())).unwrap();
        assert_eq!(config.connect.bmc_username.as_deref(), Some("USERID"));
    }
}
