// HTTP transport
// --------------
// The resolver and the publishers never talk to reqwest directly: they go
// through the small `Transport` trait below. `ApiClient` is the real,
// blocking implementation; `mock::MockTransport` records calls for tests.

use crate::error::TransportError;
use anyhow::Context;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use std::fmt;
use tracing::debug;

pub mod mock;

/// Status and raw body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

/// A form-encoded POST, fully built but not yet sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRequest {
    pub endpoint: String,
    pub fields: Vec<(String, String)>,
    pub basic_auth: Option<BasicAuth>,
}

impl FormRequest {
    /// Value of the first field called `name`.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Human readable dump used by dry runs. Passwords are masked.
impl fmt::Display for FormRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "POST {}", self.endpoint)?;
        if let Some(auth) = &self.basic_auth {
            writeln!(f, "basic auth: {} / ********", auth.username)?;
        }
        for (key, value) in &self.fields {
            if key == "password" {
                writeln!(f, "  {key} = ********")?;
            } else {
                writeln!(f, "  {key} = {value}")?;
            }
        }
        Ok(())
    }
}

pub trait Transport {
    /// GET `url` with the given query pairs and `Accept` header.
    fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        accept: &str,
    ) -> Result<HttpResponse, TransportError>;

    /// Send a form-encoded POST.
    fn post_form(&self, request: &FormRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking reqwest client used by the binary.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient { client })
    }

    fn read(url: &str, res: reqwest::blocking::Response) -> Result<HttpResponse, TransportError> {
        let status = res.status().as_u16();
        let body = res.text().map_err(|e| TransportError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        debug!(url, status, bytes = body.len(), "received response");
        Ok(HttpResponse { status, body })
    }
}

impl Transport for ApiClient {
    fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        accept: &str,
    ) -> Result<HttpResponse, TransportError> {
        debug!(url, ?query, "GET");
        let res = self
            .client
            .get(url)
            .header(ACCEPT, accept)
            .query(query)
            .send()
            .map_err(|e| TransportError::Request {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Self::read(url, res)
    }

    fn post_form(&self, request: &FormRequest) -> Result<HttpResponse, TransportError> {
        let url = request.endpoint.as_str();
        debug!(url, fields = request.fields.len(), "POST");
        let mut req = self.client.post(url).form(&request.fields);
        if let Some(auth) = &request.basic_auth {
            req = req.basic_auth(&auth.username, Some(&auth.password));
        }
        let res = req.send().map_err(|e| TransportError::Request {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Self::read(url, res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> FormRequest {
        FormRequest {
            endpoint: "http://www.tumblr.com/api/write".to_string(),
            fields: vec![
                ("type".to_string(), "regular".to_string()),
                ("email".to_string(), "me@example.com".to_string()),
                ("password".to_string(), "hunter2".to_string()),
            ],
            basic_auth: None,
        }
    }

    #[test]
    fn test_field_lookup() {
        let req = request();
        assert_eq!(req.field("type"), Some("regular"));
        assert_eq!(req.field("title"), None);
    }

    #[test]
    fn test_display_masks_password() {
        let text = request().to_string();
        assert!(text.starts_with("POST http://www.tumblr.com/api/write"));
        assert!(text.contains("email = me@example.com"));
        assert!(!text.contains("hunter2"));
    }

    #[test]
    fn test_display_masks_basic_auth() {
        let req = FormRequest {
            endpoint: "http://posterous.com/api/newpost".to_string(),
            fields: vec![],
            basic_auth: Some(BasicAuth {
                username: "me@example.com".to_string(),
                password: "hunter2".to_string(),
            }),
        };
        let text = req.to_string();
        assert!(text.contains("basic auth: me@example.com / ********"));
        assert!(!text.contains("hunter2"));
    }

    #[test]
    fn test_success_range() {
        assert!(HttpResponse { status: 201, body: String::new() }.is_success());
        assert!(!HttpResponse { status: 403, body: String::new() }.is_success());
    }
}
