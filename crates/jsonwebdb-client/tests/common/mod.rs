#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use jsonwebdb_client::{JwdbError, JwdbResult, Session};
use serde_json::Value;

/// Session double that records every request and answers from a script.
pub struct MockSession {
    guid: Mutex<Option<String>>,
    replies: Mutex<VecDeque<Value>>,
    sent: Mutex<Vec<Value>>,
}

impl MockSession {
    pub fn connected(replies: Vec<Value>) -> Arc<Self> {
        Arc::new(Self {
            guid: Mutex::new(Some("0f6e-guid".to_string())),
            replies: Mutex::new(replies.into()),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn disconnected() -> Arc<Self> {
        Arc::new(Self {
            guid: Mutex::new(None),
            replies: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn sent(&self) -> Vec<Value> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last(&self) -> Value {
        self.sent().last().cloned().expect("no request sent")
    }

    /// Drops the guid, as if the backend session expired.
    pub fn expire(&self) {
        *self.guid.lock().unwrap() = None;
    }

    pub fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Session for MockSession {
    fn guid(&self) -> Option<String> {
        self.guid.lock().unwrap().clone()
    }

    async fn invoke(&self, request: Value) -> JwdbResult<Value> {
        self.sent.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| JwdbError::Internal("mock session ran out of replies".into()))
    }
}

pub fn as_dyn(session: &Arc<MockSession>) -> Arc<dyn Session> {
    session.clone()
}
