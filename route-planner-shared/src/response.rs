//! Decoding of the route generation response.
//!
//! The endpoint answers with one of three JSON shapes and the client tells them apart by which keys
//! are present. The shapes are checked in a fixed order (not routable, then error, then success) and
//! the first match wins, since nothing stops a body from carrying more than one of the keys.

use serde::{ser::SerializeMap, Serialize};
use serde_json::Value;

use crate::error::ResponseError;

pub const NOT_ROUTABLE_KEY: &str = "notRoutableException";
pub const ERROR_KEY: &str = "error";
pub const ERRORS_KEY: &str = "errors";
pub const ROUTE_URL_KEY: &str = "route_url";
pub const ROUTE_KEY_KEY: &str = "route_key";

#[derive(Debug, Clone, PartialEq)]
pub enum RouteResponse {
    /// The addresses could not be connected by a route.
    NotRoutable,
    /// Validation or processing failed on the server.
    Error(ErrorDetails),
    /// The route was built and can be viewed at `route_url`.
    Success {
        route_url: String,
        route_key: Option<String>,
    },
}

/// Whatever the server put under `errors` (or `error`).
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDetails(Value);

impl ErrorDetails {
    pub fn new(raw: Value) -> Self {
        ErrorDetails(raw)
    }

    pub fn from_messages<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ErrorDetails(Value::Array(
            messages
                .into_iter()
                .map(|m| Value::String(m.into()))
                .collect(),
        ))
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }

    /// Flattens the payload into readable lines. Strings are kept as is, anything else is rendered
    /// as JSON.
    pub fn messages(&self) -> Vec<String> {
        fn render(v: &Value) -> String {
            match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }
        }

        match &self.0 {
            Value::Null => vec![],
            Value::Array(items) => items.iter().map(render).collect(),
            Value::Object(fields) => fields
                .iter()
                .map(|(k, v)| format!("{}: {}", k, render(v)))
                .collect(),
            other => vec![render(other)],
        }
    }
}

impl RouteResponse {
    pub fn from_value(value: &Value) -> Result<RouteResponse, ResponseError> {
        let Value::Object(body) = value else {
            return Err(ResponseError::NotAnObject);
        };

        if body.contains_key(NOT_ROUTABLE_KEY) {
            return Ok(RouteResponse::NotRoutable);
        }

        if let Some(details) = body.get(ERRORS_KEY).or_else(|| body.get(ERROR_KEY)) {
            return Ok(RouteResponse::Error(ErrorDetails(details.clone())));
        }

        let Some(Value::String(route_url)) = body.get(ROUTE_URL_KEY) else {
            return Err(ResponseError::MissingRouteUrl);
        };

        let route_key = match body.get(ROUTE_KEY_KEY) {
            Some(Value::String(key)) => Some(key.clone()),
            _ => None,
        };

        Ok(RouteResponse::Success {
            route_url: route_url.clone(),
            route_key,
        })
    }
}

impl Serialize for RouteResponse {
    // Server side of the same protocol, one key per shape.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            RouteResponse::NotRoutable => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(NOT_ROUTABLE_KEY, &true)?;
                map.end()
            }
            RouteResponse::Error(details) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(ERRORS_KEY, details.raw())?;
                map.end()
            }
            RouteResponse::Success {
                route_url,
                route_key,
            } => {
                let mut map = serializer.serialize_map(None)?;
                if let Some(key) = route_key {
                    map.serialize_entry(ROUTE_KEY_KEY, key)?;
                }
                map.serialize_entry(ROUTE_URL_KEY, route_url)?;
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_not_routable() {
        assert_eq!(
            RouteResponse::from_value(&json!({ "notRoutableException": true })),
            Ok(RouteResponse::NotRoutable)
        );
        // Only presence matters.
        assert_eq!(
            RouteResponse::from_value(&json!({ "notRoutableException": null })),
            Ok(RouteResponse::NotRoutable)
        );
    }

    #[test]
    fn test_error_and_errors() {
        let single = RouteResponse::from_value(&json!({ "error": "bad input" })).unwrap();
        let RouteResponse::Error(details) = single else {
            panic!("expected an error response, got {:?}", single);
        };
        assert_eq!(details.messages(), vec!["bad input".to_string()]);

        let many = RouteResponse::from_value(&json!({ "errors": ["one", 2] })).unwrap();
        let RouteResponse::Error(details) = many else {
            panic!("expected an error response, got {:?}", many);
        };
        assert_eq!(details.messages(), vec!["one".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_success() {
        assert_eq!(
            RouteResponse::from_value(&json!({ "route_url": "/routes/42" })),
            Ok(RouteResponse::Success {
                route_url: "/routes/42".to_string(),
                route_key: None,
            })
        );
        assert_eq!(
            RouteResponse::from_value(&json!({ "route_key": "abc", "route_url": "/route/abc/" })),
            Ok(RouteResponse::Success {
                route_url: "/route/abc/".to_string(),
                route_key: Some("abc".to_string()),
            })
        );
    }

    #[test]
    fn test_first_match_wins() {
        let body = json!({
            "errors": ["also broken"],
            "notRoutableException": true,
            "route_url": "/routes/1"
        });
        assert_eq!(RouteResponse::from_value(&body), Ok(RouteResponse::NotRoutable));

        let body = json!({ "error": "broken", "route_url": "/routes/1" });
        assert!(matches!(
            RouteResponse::from_value(&body),
            Ok(RouteResponse::Error(_))
        ));
    }

    #[test]
    fn test_malformed_bodies() {
        assert_eq!(
            RouteResponse::from_value(&json!(null)),
            Err(ResponseError::NotAnObject)
        );
        assert_eq!(
            RouteResponse::from_value(&json!(["route_url"])),
            Err(ResponseError::NotAnObject)
        );
        assert_eq!(
            RouteResponse::from_value(&json!({})),
            Err(ResponseError::MissingRouteUrl)
        );
        assert_eq!(
            RouteResponse::from_value(&json!({ "route_url": 42 })),
            Err(ResponseError::MissingRouteUrl)
        );
    }

    #[test]
    fn test_serialize_matches_decoder() {
        let responses = [
            RouteResponse::NotRoutable,
            RouteResponse::Error(ErrorDetails::from_messages(["Value for 'city' is empty."])),
            RouteResponse::Success {
                route_url: "/route/0000000000000001/".to_string(),
                route_key: Some("0000000000000001".to_string()),
            },
        ];

        for response in responses {
            let value = serde_json::to_value(&response).unwrap();
            assert_eq!(RouteResponse::from_value(&value), Ok(response));
        }
    }
}
