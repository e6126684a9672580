//! The function-invocation envelope: what a handler receives and returns.
//! Field names match the serverless event format so a platform event can be
//! deserialized straight into a [`FunctionRequest`].

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionRequest {
    #[serde(default = "default_method")]
    pub http_method: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub query_string_parameters: HashMap<String, String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: Option<String>,
    /// Set when `body` carries base64 of raw bytes that are not UTF-8.
    #[serde(default)]
    pub is_base64_encoded: bool,
}

fn default_method() -> String {
    "GET".to_string()
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<HashMap<String, String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl FunctionRequest {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            http_method: method.into(),
            query_string_parameters: HashMap::new(),
            headers: HashMap::new(),
            body: None,
            is_base64_encoded: false,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_string_parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Query parameter lookup. Empty values count as absent.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query_string_parameters
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl FunctionResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_event_defaults() {
        let req: FunctionRequest =
            serde_json::from_str(r#"{"queryStringParameters": null}"#).unwrap();
        assert_eq!(req.http_method, "GET");
        assert!(req.query_string_parameters.is_empty());
        assert!(req.headers.is_empty());
        assert!(req.body.is_none());
        assert!(!req.is_base64_encoded);
    }

    #[test]
    fn test_query_treats_empty_as_missing() {
        let req = FunctionRequest::new("GET")
            .with_query("userId", "")
            .with_query("contactId", "4");
        assert_eq!(req.query("userId"), None);
        assert_eq!(req.query("contactId"), Some("4"));
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let req = FunctionRequest::new("GET").with_header("x-user-id", "9");
        assert_eq!(req.header("X-User-Id"), Some("9"));
    }

    #[test]
    fn test_response_serializes_envelope_names() {
        let resp = FunctionResponse {
            status_code: 200,
            headers: BTreeMap::new(),
            body: String::new(),
            is_base64_encoded: false,
        };
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["statusCode"], 200);
        assert_eq!(value["isBase64Encoded"], false);
    }
}
