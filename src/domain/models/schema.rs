//! Stored record schemas.
//!
//! Sorted-set members and simple elements are JSON documents mirroring
//! the upstream API schema: an `obj` envelope holding a metadata map and
//! a kind-specific property block. Cascade handlers mostly parse members
//! to harvest `obj.metadata` for subordinate tasks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Venture {
    #[serde(default)]
    pub obj: VentureObj,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VentureObj {
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub property: VentureProperty,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VentureProperty {
    #[serde(default)]
    pub name: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Timeline {
    #[serde(default)]
    pub obj: TimelineObj,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TimelineObj {
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub property: TimelineProperty,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TimelineProperty {
    #[serde(default)]
    pub name: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub obj: UpdateObj,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateObj {
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub property: UpdateProperty,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateProperty {
    /// Update headline.
    #[serde(default)]
    pub head: String,
    /// Rich-text body as a serialized slate node tree.
    #[serde(default)]
    pub text: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub obj: MessageObj,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MessageObj {
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub property: MessageProperty,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MessageProperty {
    #[serde(default)]
    pub text: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub obj: UserObj,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UserObj {
    /// Feature flags live here alongside the usual ID labels.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub property: UserProperty,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UserProperty {
    #[serde(default)]
    pub mail: String,
    #[serde(default)]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::metadata;

    #[test]
    fn records_tolerate_missing_blocks() {
        let t: Timeline = serde_json::from_str(r#"{"obj":{"metadata":{}}}"#).unwrap();
        assert!(t.obj.property.name.is_empty());

        let u: User = serde_json::from_str(r#"{}"#).unwrap();
        assert!(u.obj.property.mail.is_empty());
    }

    #[test]
    fn member_metadata_survives_the_round_trip() {
        let raw = format!(
            r#"{{"obj":{{"metadata":{{"{}":"5","{}":"9"}},"property":{{"name":"Launch"}}}}}}"#,
            metadata::VENTURE_ID,
            metadata::TIMELINE_ID,
        );

        let t: Timeline = serde_json::from_str(&raw).unwrap();
        assert_eq!(t.obj.metadata.get(metadata::TIMELINE_ID).unwrap(), "9");
        assert_eq!(t.obj.property.name, "Launch");
    }
}
