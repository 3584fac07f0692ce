//! Recording transport used by the resolver and query tests.

use crate::client::Transport;
use crate::models::{OneDistError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Call {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

/// Replays queued responses in order and records every request.
#[derive(Default)]
pub(crate) struct RecordingTransport {
    responses: Mutex<VecDeque<Result<Value>>>,
    calls: Mutex<Vec<Call>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, body: Value) -> Self {
        self.responses.lock().unwrap().push_back(Ok(body));
        self
    }

    pub fn fail(self, status: u16, body: &str) -> Self {
        self.responses.lock().unwrap().push_back(Err(OneDistError::Http {
            status,
            body: body.to_string(),
        }));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, method: &'static str, path: &str, body: Option<&Value>) -> Result<Value> {
        self.calls.lock().unwrap().push(Call {
            method,
            path: path.to_string(),
            body: body.cloned(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected {method} {path}: no response queued"))
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn get(&self, path: &str) -> Result<Value> {
        self.record("GET", path, None)
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.record("POST", path, Some(body))
    }
}
