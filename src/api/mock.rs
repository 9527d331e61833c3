// Recording transport for tests
// -----------------------------
// `MockTransport` answers every GET and POST with canned responses and
// remembers what it was asked, so tests can check what would have gone
// over the wire (or that nothing did). Clones share the same recording.

use std::sync::{Arc, Mutex};

use super::{FormRequest, HttpResponse, Transport};
use crate::error::TransportError;

/// A GET as seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedGet {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub accept: String,
}

#[derive(Debug, Default)]
struct Recording {
    gets: Vec<RecordedGet>,
    posts: Vec<FormRequest>,
}

#[derive(Debug, Clone)]
pub struct MockTransport {
    get_response: Result<HttpResponse, String>,
    post_response: Result<HttpResponse, String>,
    recording: Arc<Mutex<Recording>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self {
            get_response: Ok(HttpResponse {
                status: 200,
                body: r#"{"title":"Song","user":{"username":"bob"}}"#.to_string(),
            }),
            post_response: Ok(HttpResponse {
                status: 201,
                body: "12345".to_string(),
            }),
            recording: Arc::new(Mutex::new(Recording::default())),
        }
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer resolve calls with `status` and `body`.
    pub fn with_resolve(mut self, status: u16, body: &str) -> Self {
        self.get_response = Ok(HttpResponse {
            status,
            body: body.to_string(),
        });
        self
    }

    /// Answer publish calls with `status` and `body`.
    pub fn with_publish(mut self, status: u16, body: &str) -> Self {
        self.post_response = Ok(HttpResponse {
            status,
            body: body.to_string(),
        });
        self
    }

    /// Fail every GET with a transport error.
    pub fn failing_get(mut self, message: &str) -> Self {
        self.get_response = Err(message.to_string());
        self
    }

    /// Fail every POST with a transport error.
    pub fn failing_post(mut self, message: &str) -> Self {
        self.post_response = Err(message.to_string());
        self
    }

    pub fn gets(&self) -> Vec<RecordedGet> {
        self.lock().gets.clone()
    }

    pub fn posts(&self) -> Vec<FormRequest> {
        self.lock().posts.clone()
    }

    /// Total number of requests issued, GETs and POSTs together.
    pub fn call_count(&self) -> usize {
        let recording = self.lock();
        recording.gets.len() + recording.posts.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recording> {
        // A poisoned lock only means another test thread panicked mid-record.
        self.recording.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn answer(
        url: &str,
        response: &Result<HttpResponse, String>,
    ) -> Result<HttpResponse, TransportError> {
        response.clone().map_err(|message| TransportError::Request {
            url: url.to_string(),
            message,
        })
    }
}

impl Transport for MockTransport {
    fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        accept: &str,
    ) -> Result<HttpResponse, TransportError> {
        self.lock().gets.push(RecordedGet {
            url: url.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            accept: accept.to_string(),
        });
        Self::answer(url, &self.get_response)
    }

    fn post_form(&self, request: &FormRequest) -> Result<HttpResponse, TransportError> {
        self.lock().posts.push(request.clone());
        Self::answer(&request.endpoint, &self.post_response)
    }
}
