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
// jsonmap.rs
// Pulling links out of Redfish JSON bodies. A missing or mistyped key becomes an error naming
// the key and the URL it was read from, never a panic.

use std::any::type_name;

use serde::de::DeserializeOwned;

use crate::RedfishError;

pub type JsonObject = serde_json::Map<String, serde_json::Value>;

// JsonMap is the lookup seam the helpers below are written against.
pub trait JsonMap {
    fn get_value(&self, key: &str) -> Option<&serde_json::Value>;

    fn remove_value(&mut self, key: &str) -> Option<serde_json::Value>;
}

impl JsonMap for JsonObject {
    fn get_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.get(key)
    }

    fn remove_value(&mut self, key: &str) -> Option<serde_json::Value> {
        self.remove(key)
    }
}

fn missing_key_error(key: &str, url: &str) -> RedfishError {
    RedfishError::MissingKey {
        key: key.to_string(),
        url: url.to_string(),
    }
}

fn invalid_type_error(key: &str, expected_type: &str, url: &str) -> RedfishError {
    RedfishError::InvalidKeyType {
        key: key.to_string(),
        expected_type: expected_type.to_string(),
        url: url.to_string(),
    }
}

pub fn get_value<'a, M: JsonMap>(
    map: &'a M,
    key: &str,
    url: &str,
) -> Result<&'a serde_json::Value, RedfishError> {
    map.get_value(key)
        .ok_or_else(|| missing_key_error(key, url))
}

pub fn get_str<'a, M: JsonMap>(map: &'a M, key: &str, url: &str) -> Result<&'a str, RedfishError> {
    get_value(map, key, url)?
        .as_str()
        .ok_or_else(|| invalid_type_error(key, "string", url))
}

pub fn get_object<'a, M: JsonMap>(
    map: &'a M,
    key: &str,
    url: &str,
) -> Result<&'a JsonObject, RedfishError> {
    get_value(map, key, url)?
        .as_object()
        .ok_or_else(|| invalid_type_error(key, "object", url))
}

// get_link follows `path` through nested objects and returns the string at its last key.
// Errors name the whole dotted path, e.g. "Oem.Lenovo.Configuration.@odata.id".
pub fn get_link<'a, M: JsonMap>(
    map: &'a M,
    path: &[&str],
    url: &str,
) -> Result<&'a str, RedfishError> {
    let Some((last, parents)) = path.split_last() else {
        return Err(missing_key_error("", url));
    };
    let dotted = path.join(".");
    let mut current: Option<&JsonObject> = None;
    for key in parents {
        let next = match current {
            None => get_object(map, key, url),
            Some(obj) => get_object(obj, key, url),
        };
        current = Some(next.map_err(|e| rename_key(e, &dotted))?);
    }
    let leaf = match current {
        None => get_str(map, last, url),
        Some(obj) => get_str(obj, last, url),
    };
    leaf.map_err(|e| rename_key(e, &dotted))
}

fn rename_key(e: RedfishError, dotted: &str) -> RedfishError {
    match e {
        RedfishError::MissingKey { url, .. } => missing_key_error(dotted, &url),
        RedfishError::InvalidKeyType {
            expected_type, url, ..
        } => invalid_type_error(dotted, &expected_type, &url),
        e => e,
    }
}

// extract removes a key from a map and deserializes the value to type T.
pub fn extract<T, M: JsonMap>(map: &mut M, key: &str, url: &str) -> Result<T, RedfishError>
where
    T: DeserializeOwned,
{
    let json = map
        .remove_value(key)
        .ok_or_else(|| missing_key_error(key, url))?;
    serde_json::from_value::<T>(json).map_err(|_| invalid_type_error(key, type_name::<T>(), url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ODataId;
    use serde_json::json;

    #[test]
    fn test_get_str_success() {
        let value = json!({
            "Name": "Manager",
            "Id": "1"
        });
        let map = value.as_object().unwrap();

        let result = get_str(map, "Name", "http://test/url");
        assert_eq!(result.unwrap(), "Manager");
    }

    #[test]
    fn test_get_str_missing() {
        let map = JsonObject::new();

        let result = get_str(&map, "Name", "http://test/url");
        assert!(matches!(
            result,
            Err(RedfishError::MissingKey { ref key, ref url }) if key == "Name" && url == "http://test/url"
        ));
    }

    #[test]
    fn test_get_str_wrong_type() {
        let value = json!({ "Count": 42 });
        let map = value.as_object().unwrap();

        let result = get_str(map, "Count", "http://test/url");
        assert!(matches!(result, Err(RedfishError::InvalidKeyType { .. })));
    }

    #[test]
    fn test_get_link_nested() {
        let value = json!({
            "Oem": {
                "Lenovo": {
                    "Configuration": {"@odata.id": "/redfish/v1/Managers/1/Oem/Lenovo/Configuration"}
                }
            }
        });
        let map = value.as_object().unwrap();

        let link = get_link(
            map,
            &["Oem", "Lenovo", "Configuration", "@odata.id"],
            "/redfish/v1/Managers/1",
        );
        assert_eq!(
            link.unwrap(),
            "/redfish/v1/Managers/1/Oem/Lenovo/Configuration"
        );
    }

    #[test]
    fn test_get_link_missing_names_full_path() {
        let value = json!({ "Oem": { "Dell": {} } });
        let map = value.as_object().unwrap();

        let err = get_link(map, &["Oem", "Lenovo", "Configuration", "@odata.id"], "u")
            .unwrap_err();
        match err {
            RedfishError::MissingKey { key, url } => {
                assert_eq!(key, "Oem.Lenovo.Configuration.@odata.id");
                assert_eq!(url, "u");
            }
            e => panic!("unexpected error {e}"),
        }
    }

    #[test]
    fn test_get_link_wrong_type() {
        let value = json!({ "Managers": "/redfish/v1/Managers" });
        let map = value.as_object().unwrap();

        let err = get_link(map, &["Managers", "@odata.id"], "/redfish/v1").unwrap_err();
        assert!(matches!(
            err,
            RedfishError::InvalidKeyType { ref key, ref expected_type, .. }
                if key == "Managers.@odata.id" && expected_type == "object"
        ));
    }

    #[test]
    fn test_extract_members() {
        let mut map = JsonObject::new();
        map.insert(
            "Members".to_string(),
            json!([{"@odata.id": "/redfish/v1/Managers/1"}]),
        );

        let members: Vec<ODataId> = extract(&mut map, "Members", "http://test/url").unwrap();
        assert_eq!(members, vec![ODataId::from("/redfish/v1/Managers/1")]);
        assert!(map.is_empty());
    }

    #[test]
    fn test_extract_wrong_shape() {
        let mut map = JsonObject::new();
        map.insert("Members".to_string(), json!("nope"));

        let result: Result<Vec<ODataId>, _> = extract(&mut map, "Members", "http://test/url");
        assert!(matches!(result, Err(RedfishError::InvalidKeyType { .. })));
    }
}
