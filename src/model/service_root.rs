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
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::ODataId;

/// https://redfish.dmtf.org/schemas/v1/ServiceRoot.v1_16_0.json
/// Only the parts needed to log in and find the managers are captured.
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceRoot {
    #[serde(rename = "@odata.id")]
    pub odata_id: Option<String>,
    pub product: Option<String>,
    pub redfish_version: Option<String>,
    pub vendor: Option<String>,
    #[serde(rename = "UUID")]
    pub uuid: Option<String>,
    pub oem: Option<HashMap<String, serde_json::Value>>,
    pub managers: Option<ODataId>,
    pub session_service: Option<ODataId>,
    pub links: Option<ServiceRootLinks>,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceRootLinks {
    pub sessions: Option<ODataId>,
}

impl ServiceRoot {
    /// Vendor provided by Redfish ServiceRoot
    pub fn vendor_string(&self) -> Option<String> {
        // If there is no "Vendor" key in ServiceRoot, look for an "Oem" entry. It will have a
        // single key which is the vendor name.
        self.vendor.as_ref().cloned().or_else(|| match &self.oem {
            Some(oem) => oem.keys().next().cloned(),
            None => None,
        })
    }

    pub fn is_lenovo(&self) -> bool {
        self.vendor_string()
            .is_some_and(|v| v.eq_ignore_ascii_case("lenovo"))
    }

    /// Where new sessions are created.
    pub fn sessions_link(&self) -> Option<&str> {
        self.links
            .as_ref()
            .and_then(|l| l.sessions.as_ref())
            .map(|s| s.odata_id.as_str())
    }
}

#[cfg(test)]
mod test {
    #[test]
    fn test_lenovo_service_root() {
        let data = include_str!("testdata/lenovo_service_root.json");
        let result: super::ServiceRoot = serde_json::from_str(data).unwrap();
        assert!(result.is_lenovo());
        assert_eq!(
            result.sessions_link(),
            Some("/redfish/v1/SessionService/Sessions")
        );
        assert_eq!(
            result.managers.unwrap().odata_id,
            "/redfish/v1/Managers"
        );
    }

    #[test]
    fn test_vendor_from_oem_key() {
        let data = r#"{"RedfishVersion": "1.6.0", "Oem": {"Lenovo": {}}}"#;
        let result: super::ServiceRoot = serde_json::from_str(data).unwrap();
        assert_eq!(result.vendor_string().as_deref(), Some("Lenovo"));
        assert!(result.sessions_link().is_none());
    }
}
