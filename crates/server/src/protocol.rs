//! Wire protocol types and request dispatch.

use engine::Engine;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// One client request, decoded from a single JSON line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub operation: String,
    #[serde(default)]
    pub key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
}

/// One server response, encoded as a single JSON line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub data: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

impl Response {
    pub fn ok(data: impl Into<String>) -> Self {
        Self {
            success: true,
            data: data.into(),
            error: String::new(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: String::new(),
            error: error.into(),
        }
    }
}

/// Executes one request against the shared engine.
///
/// Operation names are case-insensitive. Engine errors are surfaced in the
/// response's `error` field; they never tear down the connection.
pub fn process(engine: &RwLock<Engine>, request: &Request) -> Response {
    match request.operation.to_uppercase().as_str() {
        "GET" => {
            if request.key.is_empty() {
                return Response::failure("Key required for GET operation");
            }
            match engine.read().read(&request.key) {
                Ok(value) => Response::ok(String::from_utf8_lossy(&value)),
                Err(e) => Response::failure(e.to_string()),
            }
        }
        "SET" => {
            if request.key.is_empty() {
                return Response::failure("Key required for SET operation");
            }
            match engine.write().write(&request.key, request.value.as_bytes()) {
                Ok(()) => Response {
                    success: true,
                    ..Response::default()
                },
                Err(e) => Response::failure(e.to_string()),
            }
        }
        "LIST" => {
            let mut pairs = Vec::new();
            engine.read().iter(|key, value| {
                pairs.push(format!("{}={}", key, String::from_utf8_lossy(value)));
                true
            });
            Response::ok(pairs.join("\n"))
        }
        other => Response::failure(format!("Unsupported operation: {}", other)),
    }
}
