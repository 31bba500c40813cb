//! The function's trigger contract: the invocation event coming in and the
//! response envelope going out.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::models::ErrorBody;

pub const ALLOWED_METHODS: &str = "GET, POST, DELETE, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type";
pub const PREFLIGHT_MAX_AGE: &str = "86400";

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    pub http_method: Option<String>,
    pub body: Option<String>,
    pub query_string_parameters: Option<HashMap<String, String>>,
}

impl Invocation {
    /// Upper-cased method, `GET` when the event carries none.
    pub fn method(&self) -> String {
        self.http_method
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or("GET")
            .to_ascii_uppercase()
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_string_parameters
            .as_ref()
            .and_then(|q| q.get(name))
            .map(String::as_str)
    }

    pub fn body_or_empty_object(&self) -> &str {
        match self.body.as_deref() {
            Some(b) if !b.trim().is_empty() => b,
            _ => "{}",
        }
    }
}

/// Caller-provided metadata. Only used to correlate log lines.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    pub request_id: String,
    pub function_name: String,
}

impl InvocationContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            function_name: env!("CARGO_PKG_NAME").to_string(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl Envelope {
    fn with_headers(status_code: u16, body: String) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
        Self {
            status_code,
            headers,
            body,
            is_base64_encoded: false,
        }
    }

    pub fn json<T: Serialize>(status_code: u16, body: &T) -> Self {
        match serde_json::to_string(body) {
            Ok(body) => Self::with_headers(status_code, body),
            Err(err) => {
                log::error!("cannot serialize response body: {err}");
                Self::error(500, "Internal server error")
            }
        }
    }

    pub fn error(status_code: u16, message: impl Into<String>) -> Self {
        let body = ErrorBody {
            error: message.into(),
        };
        // a struct with one String field always serializes
        let body = serde_json::to_string(&body).unwrap_or_default();
        Self::with_headers(status_code, body)
    }

    pub fn preflight() -> Self {
        let mut env = Self::with_headers(200, String::new());
        env.headers.insert(
            "Access-Control-Allow-Methods".to_string(),
            ALLOWED_METHODS.to_string(),
        );
        env.headers.insert(
            "Access-Control-Allow-Headers".to_string(),
            ALLOWED_HEADERS.to_string(),
        );
        env.headers.insert(
            "Access-Control-Max-Age".to_string(),
            PREFLIGHT_MAX_AGE.to_string(),
        );
        env
    }
}
