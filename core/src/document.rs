//! JSON:API document model.
//!
//! # Design
//! Primary `data` may be a single resource, a list, or `null`; it is always
//! normalised into `Document::resources` so callers never branch on shape.
//! Unknown top-level members are ignored. Attribute values stay as
//! `serde_json::Value` because their schema belongs to the remote service.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// A single JSON:API resource object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceObject {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub relationships: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl ResourceObject {
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }
}

/// A JSON:API error object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PrimaryData {
    Many(Vec<ResourceObject>),
    One(Box<ResourceObject>),
}

/// Wire shape of a document before `data` is normalised.
#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    data: Option<PrimaryData>,
    #[serde(default)]
    included: Vec<ResourceObject>,
    #[serde(default)]
    errors: Vec<ErrorObject>,
    #[serde(default)]
    meta: Option<Value>,
    #[serde(default)]
    links: Option<Value>,
}

/// A parsed JSON:API document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub resources: Vec<ResourceObject>,
    pub included: Vec<ResourceObject>,
    pub errors: Vec<ErrorObject>,
    pub meta: Option<Value>,
    pub links: Option<Value>,
}

impl Document {
    pub fn parse(json: &str) -> Result<Self, ApiError> {
        Self::from_slice(json.as_bytes())
    }

    /// Parse a document; anything but a JSON object at the top level fails.
    pub fn from_slice(json: &[u8]) -> Result<Self, ApiError> {
        let value: Value =
            serde_json::from_slice(json).map_err(|e| ApiError::Parse(e.to_string()))?;
        if !value.is_object() {
            return Err(ApiError::Parse(format!(
                "expected a JSON object at the top level, got {value}"
            )));
        }
        let raw: RawDocument =
            serde_json::from_value(value).map_err(|e| ApiError::Parse(e.to_string()))?;
        let resources = match raw.data {
            None => Vec::new(),
            Some(PrimaryData::Many(resources)) => resources,
            Some(PrimaryData::One(resource)) => vec![*resource],
        };
        Ok(Self {
            resources,
            included: raw.included,
            errors: raw.errors,
            meta: raw.meta,
            links: raw.links,
        })
    }

    /// Title of the first error entry, if it has one.
    pub fn first_error_title(&self) -> Option<&str> {
        self.errors.first().and_then(|error| error.title.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_resource_is_normalised_to_list() {
        let doc = Document::parse(
            r#"{"data":{"type":"user","id":"1","attributes":{"name":"Ada"}}}"#,
        )
        .unwrap();
        assert_eq!(doc.resources.len(), 1);
        assert_eq!(doc.resources[0].resource_type, "user");
        assert_eq!(doc.resources[0].id.as_deref(), Some("1"));
        assert_eq!(doc.resources[0].attribute("name"), Some(&Value::from("Ada")));
    }

    #[test]
    fn resource_list_keeps_order() {
        let doc = Document::parse(
            r#"{"data":[{"type":"t","id":"2"},{"type":"t","id":"1"}],"meta":{"total":2}}"#,
        )
        .unwrap();
        let ids: Vec<_> = doc.resources.iter().map(|r| r.id.as_deref()).collect();
        assert_eq!(ids, [Some("2"), Some("1")]);
        assert_eq!(doc.meta, Some(serde_json::json!({"total": 2})));
    }

    #[test]
    fn null_or_missing_data_means_no_resources() {
        assert!(Document::parse(r#"{"data":null}"#).unwrap().resources.is_empty());
        assert!(Document::parse(r#"{}"#).unwrap().resources.is_empty());
    }

    #[test]
    fn errors_are_parsed() {
        let doc = Document::parse(
            r#"{"errors":[{"status":"404","title":"Not Found","detail":"no user 9"}]}"#,
        )
        .unwrap();
        assert_eq!(doc.first_error_title(), Some("Not Found"));
        assert_eq!(doc.errors[0].status.as_deref(), Some("404"));
    }

    #[test]
    fn included_resources_are_kept_apart() {
        let doc = Document::parse(
            r#"{"data":{"type":"post","id":"1"},"included":[{"type":"user","id":"9"}]}"#,
        )
        .unwrap();
        assert_eq!(doc.resources.len(), 1);
        assert_eq!(doc.included[0].resource_type, "user");
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(Document::parse("oops"), Err(ApiError::Parse(_))));
        assert!(matches!(Document::parse("[1,2]"), Err(ApiError::Parse(_))));
        assert!(matches!(Document::parse("[]"), Err(ApiError::Parse(_))));
        assert!(matches!(Document::parse("\"text\""), Err(ApiError::Parse(_))));
        assert!(matches!(Document::parse(""), Err(ApiError::Parse(_))));
    }

    #[test]
    fn first_error_title_is_optional() {
        let doc = Document::parse(r#"{"errors":[{"status":"500"}]}"#).unwrap();
        assert_eq!(doc.first_error_title(), None);
    }
}
