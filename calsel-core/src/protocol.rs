//! Service message protocol types.
//!
//! Defines the JSON request/response protocol spoken between foreground
//! sync clients and the background persistence service. Payloads carry
//! the preset document as opaque JSON; serialization at this boundary is
//! what gives callers copy semantics.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Actions a sync client can request from the persistence service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    Ping,
    GetGroups,
    SaveGroups,
}

/// Request sent from a sync client to the service.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub action: Action,
    /// Full preset document; present on `saveGroups` only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Value>,
}

impl Request {
    pub fn ping() -> Self {
        Request {
            action: Action::Ping,
            groups: None,
        }
    }

    pub fn get_groups() -> Self {
        Request {
            action: Action::GetGroups,
            groups: None,
        }
    }

    pub fn save_groups(document: Value) -> Self {
        Request {
            action: Action::SaveGroups,
            groups: Some(document),
        }
    }
}

/// Response sent from the service back to the client.
#[derive(Debug, Serialize, Deserialize)]
pub struct Reply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Reply {
    pub fn ok() -> Self {
        Reply {
            success: true,
            groups: None,
            error: None,
        }
    }

    pub fn with_groups(document: Value) -> Self {
        Reply {
            success: true,
            groups: Some(document),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Reply {
            success: false,
            groups: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn actions_use_camel_case_on_the_wire() {
        let request = serde_json::to_value(Request::get_groups()).unwrap();
        assert_eq!(request, json!({ "action": "getGroups" }));

        let request = serde_json::to_value(Request::ping()).unwrap();
        assert_eq!(request, json!({ "action": "ping" }));
    }

    #[test]
    fn save_request_carries_the_document() {
        let request = Request::save_groups(json!({ "__last_saved": [], "__v": 1 }));
        let wire = serde_json::to_value(&request).unwrap();
        assert_eq!(
            wire,
            json!({ "action": "saveGroups", "groups": { "__last_saved": [], "__v": 1 } })
        );
    }

    #[test]
    fn replies_omit_absent_fields() {
        assert_eq!(serde_json::to_value(Reply::ok()).unwrap(), json!({ "success": true }));
        assert_eq!(
            serde_json::to_value(Reply::failure("quota exceeded")).unwrap(),
            json!({ "success": false, "error": "quota exceeded" })
        );
    }
}
