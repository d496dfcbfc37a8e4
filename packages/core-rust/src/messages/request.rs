//! Inbound request envelope.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::domain::UserRole;

// ---------------------------------------------------------------------------
// OperationKind
// ---------------------------------------------------------------------------

/// Operation selector carried in the envelope's `type` field.
///
/// Decoding never fails on the selector: values outside the routing table
/// map to `Unknown`, so an unroutable request still produces an error
/// envelope instead of being dropped as undecodable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Login,
    Signup,
    Update,
    Delete,
    List,
    Unknown,
}

impl OperationKind {
    /// Wire spelling of the selector.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Signup => "signup",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::List => "list",
            Self::Unknown => "unknown",
        }
    }

    fn from_wire(s: &str) -> Self {
        match s {
            "login" => Self::Login,
            "signup" => Self::Signup,
            "update" => Self::Update,
            "delete" => Self::Delete,
            "list" => Self::List,
            _ => Self::Unknown,
        }
    }
}

impl Serialize for OperationKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OperationKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&tag))
    }
}

// ---------------------------------------------------------------------------
// RequestMessage
// ---------------------------------------------------------------------------

/// One request pulled from the input queue.
///
/// `kind` is mandatory; every other field is operation-dependent and
/// optional. A field required by the chosen operation but absent from the
/// envelope is a caller error that surfaces as a domain failure in the
/// response, never as a decode failure. Absent fields stay absent when the
/// envelope is re-serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestMessage {
    #[serde(rename = "type")]
    pub kind: OperationKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub uid: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub offset: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub limit: Option<u64>,
}

impl RequestMessage {
    /// Empty envelope for the given operation; fields are filled by the
    /// caller as the operation requires.
    #[must_use]
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            name: None,
            email: None,
            password: None,
            role: None,
            uid: None,
            token: None,
            offset: None,
            limit: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_round_trip_preserves_populated_fields() {
        let mut msg = RequestMessage::new(OperationKind::Login);
        msg.email = Some("a@b.com".to_string());
        msg.password = Some("secret".to_string());

        let json = serde_json::to_string(&msg).unwrap();
        let back: RequestMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn absent_fields_stay_absent_on_the_wire() {
        let msg = RequestMessage::new(OperationKind::Delete);
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"delete"}"#);
    }

    #[test]
    fn every_operation_kind_round_trips() {
        for kind in [
            OperationKind::Login,
            OperationKind::Signup,
            OperationKind::Update,
            OperationKind::Delete,
            OperationKind::List,
        ] {
            let msg = RequestMessage::new(kind);
            let json = serde_json::to_string(&msg).unwrap();
            let back: RequestMessage = serde_json::from_str(&json).unwrap();
            assert_eq!(back.kind, kind);
        }
    }

    #[test]
    fn unrecognized_type_decodes_to_unknown() {
        let back: RequestMessage =
            serde_json::from_str(r#"{"type":"purge","uid":9}"#).unwrap();
        assert_eq!(back.kind, OperationKind::Unknown);
        assert_eq!(back.uid, Some(9));
    }

    #[test]
    fn missing_type_fails_the_decode() {
        // The selector is the one mandatory field; a body without it is a
        // malformed delivery, not an unknown operation.
        assert!(serde_json::from_str::<RequestMessage>(r#"{"uid":1}"#).is_err());
    }

    #[test]
    fn signup_envelope_decodes_all_fields() {
        let json = r#"{
            "type": "signup",
            "name": "Ada",
            "email": "ada@example.com",
            "password": "pw",
            "role": "admin"
        }"#;
        let msg: RequestMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.kind, OperationKind::Signup);
        assert_eq!(msg.name.as_deref(), Some("Ada"));
        assert_eq!(msg.role, Some(crate::domain::UserRole::Admin));
        assert!(msg.uid.is_none());
    }

    #[test]
    fn list_envelope_decodes_pagination() {
        let msg: RequestMessage =
            serde_json::from_str(r#"{"type":"list","offset":2,"limit":25}"#).unwrap();
        assert_eq!(msg.kind, OperationKind::List);
        assert_eq!(msg.offset, Some(2));
        assert_eq!(msg.limit, Some(25));
    }
}
