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
use serde::{Deserialize, Serialize};

/// The body a Redfish service sends back with a 4XX/5XX status.
/// http://redfish.dmtf.org/schemas/v1/RedfishError.v1_0_1.json
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub struct RedfishErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub struct ErrorDetail {
    pub code: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "@Message.ExtendedInfo", default)]
    pub extended_info: Vec<ExtendedInfo>,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct ExtendedInfo {
    pub message_id: Option<String>,
    pub message: Option<String>,
    pub resolution: Option<String>,
    pub severity: Option<String>,
    #[serde(default)]
    pub message_args: Vec<serde_json::Value>,
}

/// Human readable detail from an error response body. Prefers the extended info messages,
/// then the top level error message, then the raw body.
pub fn extended_error(body: &str) -> String {
    let Ok(parsed) = serde_json::from_str::<RedfishErrorBody>(body) else {
        return body.trim().to_string();
    };
    let messages: Vec<&str> = parsed
        .error
        .extended_info
        .iter()
        .filter_map(|info| info.message.as_deref())
        .collect();
    if !messages.is_empty() {
        return messages.join("; ");
    }
    parsed
        .error
        .message
        .unwrap_or_else(|| body.trim().to_string())
}
