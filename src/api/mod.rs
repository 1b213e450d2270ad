//! REST collaborator. Views enqueue requests tagged with a `Ticket`; the shell
//! hands them to an `ApiClient` and later polls for deliveries, so no request
//! ever blocks the event loop.

pub mod http;
pub mod scripted;

use std::fmt;

use serde_json::Value;

pub use crate::error::ApiError;
pub use http::HttpClient;
pub use scripted::ScriptedClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    /// Raw text sent as `application/json` (an edited document the user typed).
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    /// Path and query relative to the API root, e.g. `/api/logfiles?start=...`.
    pub path: String,
    pub body: Option<RequestBody>,
}

impl Request {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>, body: RequestBody) -> Self {
        Self {
            body: Some(body),
            ..Self::new(Method::Put, path)
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }
}

/// A successful response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
}

impl Payload {
    /// The body as JSON, parsing text bodies on demand.
    pub fn into_json(self) -> Result<Value, ApiError> {
        match self {
            Payload::Json(value) => Ok(value),
            Payload::Text(text) => {
                serde_json::from_str(&text).map_err(|err| ApiError::Decode(err.to_string()))
            }
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Payload::Json(value) => value.to_string(),
            Payload::Text(text) => text,
        }
    }
}

/// Identifies which navigation issued a request and what it was for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
    pub key: String,
    /// View the response belongs to regardless of navigation. Set for
    /// requests issued from overlay buttons, which outlive the page.
    pub owner: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub ticket: Ticket,
    pub result: Result<Payload, ApiError>,
}

pub trait ApiClient {
    /// Queues `request`; the outcome is reported by a later `poll`.
    fn send(&mut self, ticket: Ticket, request: Request);

    /// Completed requests since the last poll, in completion order.
    fn poll(&mut self) -> Vec<Delivery>;
}

impl<T: ApiClient + ?Sized> ApiClient for &mut T {
    fn send(&mut self, ticket: Ticket, request: Request) {
        (**self).send(ticket, request)
    }

    fn poll(&mut self) -> Vec<Delivery> {
        (**self).poll()
    }
}

impl<T: ApiClient + ?Sized> ApiClient for Box<T> {
    fn send(&mut self, ticket: Ticket, request: Request) {
        (**self).send(ticket, request)
    }

    fn poll(&mut self) -> Vec<Delivery> {
        (**self).poll()
    }
}

/// Percent-encodes one path segment or query value.
pub fn encode_component(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
