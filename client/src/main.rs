/*
 * SPDX-FileCopyrightText: Copyright (c) 2022 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
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

/* Reset a Lenovo BMC's configuration to factory defaults.
 *
 * USAGE: ./set-bmc-config-default -i 10.153.145.103 -u TheBMCUsername -p TheBMCPassword
 * Connection settings can also come from a TOML file, see --config.
 * Run with `-v` for more output.
 */

use std::path::PathBuf;
use std::process::ExitCode;

use bmc_config_default::{set_bmc_config_default, AuthMethod, ResetResult, Scheme};
use clap::Parser;
use tracing::error;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt::Layer;
use tracing_subscriber::prelude::*;

mod config;

use config::{Config, ConnectConfig};

#[derive(Parser, Debug)]
#[command(
    name = "set-bmc-config-default",
    version,
    about = "Reset the BMC configuration to factory defaults"
)]
struct Args {
    /// BMC IP address or hostname
    #[arg(short, long)]
    ip: Option<String>,

    /// BMC user name
    #[arg(short, long)]
    user: Option<String>,

    /// BMC user password
    #[arg(short, long)]
    passwd: Option<String>,

    /// BMC port, if not the scheme's default
    #[arg(long)]
    port: Option<u16>,

    /// How to authenticate (default: session)
    #[arg(long, value_enum)]
    auth: Option<AuthMethod>,

    /// Protocol to reach the BMC with (default: https)
    #[arg(long, value_enum)]
    scheme: Option<Scheme>,

    /// Per request timeout
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Refuse self signed and other invalid certificates
    #[arg(long)]
    reject_invalid_certs: bool,

    /// TOML config file with a [connect] table. Defaults to ./config.toml if present
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log at DEBUG level. Default is INFO
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn connect_overrides(&self) -> ConnectConfig {
        ConnectConfig {
            bmc_ip: self.ip.clone(),
            bmc_username: self.user.clone(),
            bmc_user_password: self.passwd.clone(),
            port: self.port,
            auth: self.auth,
            scheme: self.scheme,
            timeout_secs: self.timeout,
            accept_invalid_certs: self.reject_invalid_certs.then_some(false),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(result) => report(&result),
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<ResetResult> {
    let config = Config::load_or_default(args.config.as_deref())?;
    let connect = config.connect.merge(args.connect_overrides());
    let endpoint = connect.endpoint()?;
    let pool = connect.client_pool()?;
    Ok(set_bmc_config_default(&pool, endpoint))
}

// Success goes to stdout as a JSON string, failure to stderr as plain text.
fn report(result: &ResetResult) -> ExitCode {
    if !result.success {
        eprintln!("{}", result.message);
        return ExitCode::FAILURE;
    }
    match serde_json::to_string_pretty(&result.message) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Could not encode result: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let log_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy()
        .add_directive("hyper=warn".parse().unwrap())
        .add_directive("reqwest=warn".parse().unwrap())
        .add_directive("rustls=warn".parse().unwrap());
    tracing_subscriber::registry()
        .with(Layer::default().compact().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_become_overrides() {
        let args = Args::try_parse_from([
            "set-bmc-config-default",
            "-i",
            "10.0.0.7",
            "-u",
            "USERID",
            "-p",
            "PASSW0RD",
            "--auth",
            "basic",
            "--reject-invalid-certs",
        ])
        .unwrap();
        let c = args.connect_overrides();
        assert_eq!(c.bmc_ip.as_deref(), Some("10.0.0.7"));
        assert_eq!(c.bmc_user_password.as_deref(), Some("PASSW0RD"));
        assert_eq!(c.auth, Some(AuthMethod::Basic));
        assert_eq!(c.accept_invalid_certs, Some(false));
        assert_eq!(c.scheme, None);
    }

    #[test]
    fn test_no_flags_leave_config_alone() {
        let args = Args::try_parse_from(["set-bmc-config-default"]).unwrap();
        let c = args.connect_overrides();
        assert_eq!(c, ConnectConfig::default());
    }

    #[test]
    fn test_bad_auth_value_rejected() {
        let result = Args::try_parse_from(["set-bmc-config-default", "--auth", "digest"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_credentials_is_usage_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"[connect]\nbmc_ip = \"10.0.0.7\"\n").unwrap();
        let args = Args::try_parse_from([
            "set-bmc-config-default",
            "-c",
            file.path().to_str().unwrap(),
        ])
        .unwrap();
        let err = run(&args).unwrap_err().to_string();
        assert!(err.contains("Missing parameters"), "{err}");
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let args = Args::try_parse_from([
            "set-bmc-config-default",
            "-c",
            path.to_str().unwrap(),
        ])
        .unwrap();
        assert!(run(&args).is_err());
    }
}
