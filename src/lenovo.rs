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
// Lenovo XClarity Controller: reset the BMC configuration to factory defaults.
//
// Nothing below knows a path other than the service root. Each step reads the link to the
// next resource out of the previous response:
//
//   /redfish/v1 -> Managers -> Members[] -> Oem.Lenovo.Configuration
//       -> Actions["#LenovoConfigurationService.ResetToDefault"].target

use reqwest::StatusCode;
use tracing::{debug, info};

use crate::jsonmap::{self, JsonObject};
use crate::model::ODataId;
use crate::network::{RedfishHttpClient, SERVICE_ROOT};
use crate::RedfishError;

const MANAGERS_LINK: [&str; 2] = ["Managers", "@odata.id"];
const CONFIGURATION_LINK: [&str; 4] = ["Oem", "Lenovo", "Configuration", "@odata.id"];
pub const RESET_TO_DEFAULT_ACTION: &str = "#LenovoConfigurationService.ResetToDefault";

pub struct Bmc<'a> {
    client: &'a RedfishHttpClient,
}

impl<'a> Bmc<'a> {
    pub fn new(client: &'a RedfishHttpClient) -> Bmc<'a> {
        Bmc { client }
    }

    /// Walks the managers and resets the configuration of the first one that has a Lenovo
    /// Configuration resource. Returns the action URL that was invoked.
    ///
    /// Managers without Lenovo OEM data are skipped. Any HTTP failure on a manager, its
    /// configuration, or the action itself ends the walk with that error.
    pub fn reset_config_to_default(&self) -> Result<String, RedfishError> {
        let managers_url = self.managers_link()?;
        let members = self.manager_members(&managers_url)?;
        debug!("{} manager(s) under {managers_url}", members.len());

        for member in &members {
            let Some(config_url) = self.configuration_link(member)? else {
                debug!(
                    "Manager {} has no Lenovo configuration resource, skipping",
                    member.odata_id_get()
                );
                continue;
            };
            let target = self.reset_target(&config_url)?;
            info!(
                "Resetting configuration of manager {} via {target}",
                member.odata_id_get()
            );
            self.invoke_reset(&target)?;
            return Ok(target);
        }
        Err(RedfishError::NoEligibleManager { url: managers_url })
    }

    fn managers_link(&self) -> Result<String, RedfishError> {
        let (status_code, root) = self.get_resource(SERVICE_ROOT)?;
        jsonmap::get_link(&root, &MANAGERS_LINK, SERVICE_ROOT)
            .map(str::to_string)
            .map_err(|e| malformed(SERVICE_ROOT, status_code, e))
    }

    fn manager_members(&self, managers_url: &str) -> Result<Vec<ODataId>, RedfishError> {
        let (status_code, mut collection) = self.get_resource(managers_url)?;
        jsonmap::extract(&mut collection, "Members", managers_url)
            .map_err(|e| malformed(managers_url, status_code, e))
    }

    // None when the manager carries no Lenovo configuration link at all.
    fn configuration_link(&self, member: &ODataId) -> Result<Option<String>, RedfishError> {
        let manager_url = member.odata_id.as_str();
        let (status_code, manager) = self.get_resource(manager_url)?;
        match jsonmap::get_link(&manager, &CONFIGURATION_LINK, manager_url) {
            Ok(link) => Ok(Some(link.to_string())),
            Err(RedfishError::MissingKey { .. }) => Ok(None),
            Err(e) => Err(malformed(manager_url, status_code, e)),
        }
    }

    fn reset_target(&self, config_url: &str) -> Result<String, RedfishError> {
        let (status_code, config) = self.get_resource(config_url)?;
        jsonmap::get_link(
            &config,
            &["Actions", RESET_TO_DEFAULT_ACTION, "target"],
            config_url,
        )
        .map(str::to_string)
        .map_err(|e| malformed(config_url, status_code, e))
    }

    fn invoke_reset(&self, target: &str) -> Result<(), RedfishError> {
        // Empty body; the XCC answers 200 or 204.
        let status_code = self.client.post(target, JsonObject::new())?;
        if status_code == StatusCode::OK || status_code == StatusCode::NO_CONTENT {
            return Ok(());
        }
        Err(RedfishError::HTTPErrorCode {
            url: target.to_string(),
            status_code,
            extended: String::new(),
        })
    }

    // Every GET along the walk must answer exactly 200.
    fn get_resource(&self, url: &str) -> Result<(StatusCode, JsonObject), RedfishError> {
        // An empty or non-JSON 2XX body is a structural failure like a missing key.
        let (status_code, body): (_, JsonObject) = self.client.get(url).map_err(|e| match e {
            RedfishError::NoContent { status_code, .. }
            | RedfishError::JsonDeserializeError { status_code, .. } => {
                malformed(url, status_code, e)
            }
            e => e,
        })?;
        if status_code != StatusCode::OK {
            return Err(RedfishError::HTTPErrorCode {
                url: url.to_string(),
                status_code,
                extended: String::new(),
            });
        }
        Ok((status_code, body))
    }
}

fn malformed(url: &str, status_code: StatusCode, e: RedfishError) -> RedfishError {
    RedfishError::MalformedResponse {
        url: url.to_string(),
        status_code,
        source: Box::new(e),
    }
}
