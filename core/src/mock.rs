//! In-memory transport for tests.
//!
//! `MockTransport` returns canned results in FIFO order and captures every
//! request it sees, so tests can assert on the exact wire traffic a record
//! operation produced without a server. It panics on a request with no
//! canned result left — a test setup bug, not a runtime condition.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::RecordError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

/// A transport that replays queued results and records requests.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, RecordError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result for the next request.
    pub fn enqueue(&self, result: Result<HttpResponse, RecordError>) {
        self.responses.lock().unwrap().push_back(result);
    }

    /// Drain and return every request seen so far.
    pub fn take_requests(&self) -> Vec<HttpRequest> {
        std::mem::take(&mut self.requests.lock().unwrap())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, RecordError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("MockTransport: no canned response left for this request")
    }
}
