//! Blocking reqwest client driven from a worker thread.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use url::Url;

use super::{ApiClient, ApiError, Delivery, Method, Payload, Request, RequestBody, Ticket};

pub struct HttpClient {
    jobs: Option<Sender<(Ticket, Request)>>,
    deliveries: Receiver<Delivery>,
    failed: Vec<Delivery>,
}

impl HttpClient {
    /// Spawns the request worker. Requests run one at a time in send order.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        let (job_tx, job_rx) = mpsc::channel::<(Ticket, Request)>();
        let (done_tx, done_rx) = mpsc::channel();

        thread::Builder::new()
            .name("goup-dash-api".into())
            .spawn(move || {
                for (ticket, request) in job_rx {
                    tracing::debug!(method = %request.method, path = %request.path, "api request");
                    let result = perform(&client, &base, &request);
                    if let Err(err) = &result {
                        tracing::warn!(path = %request.path, error = %err, "api request failed");
                    }
                    if done_tx.send(Delivery { ticket, result }).is_err() {
                        break;
                    }
                }
            })
            .map_err(|err| ApiError::Transport(err.to_string()))?;

        Ok(Self {
            jobs: Some(job_tx),
            deliveries: done_rx,
            failed: Vec::new(),
        })
    }
}

impl ApiClient for HttpClient {
    fn send(&mut self, ticket: Ticket, request: Request) {
        let Some(jobs) = &self.jobs else {
            self.failed.push(Delivery {
                ticket,
                result: Err(ApiError::Disconnected),
            });
            return;
        };
        if let Err(mpsc::SendError((ticket, _))) = jobs.send((ticket, request)) {
            self.jobs = None;
            self.failed.push(Delivery {
                ticket,
                result: Err(ApiError::Disconnected),
            });
        }
    }

    fn poll(&mut self) -> Vec<Delivery> {
        let mut out = std::mem::take(&mut self.failed);
        out.extend(self.deliveries.try_iter());
        out
    }
}

/// Joins the API root and a request path without dropping a path prefix the
/// root may carry.
pub(crate) fn endpoint(base: &Url, path: &str) -> Result<Url, ApiError> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|err| ApiError::Transport(format!("{joined}: {err}")))
}

fn perform(client: &Client, base: &Url, request: &Request) -> Result<Payload, ApiError> {
    let url = endpoint(base, &request.path)?;
    let builder = match request.method {
        Method::Get => client.get(url),
        Method::Post => client.post(url),
        Method::Put => client.put(url),
        Method::Delete => client.delete(url),
    }
    .header(USER_AGENT, concat!("goup-dash/", env!("CARGO_PKG_VERSION")))
    .header(ACCEPT, "application/json, text/plain");
    let builder = match &request.body {
        Some(RequestBody::Json(value)) => builder.json(value),
        Some(RequestBody::Text(text)) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(text.clone()),
        None => builder,
    };

    let response = builder
        .send()
        .map_err(|err| ApiError::Transport(err.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
        });
    }
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("json"));
    let body = response
        .text()
        .map_err(|err| ApiError::Decode(err.to_string()))?;
    if is_json && let Ok(value) = serde_json::from_str(&body) {
        return Ok(Payload::Json(value));
    }
    Ok(Payload::Text(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_root_prefix() {
        let base = Url::parse("http://127.0.0.1:6007/").unwrap();
        assert_eq!(
            endpoint(&base, "/api/sites").unwrap().as_str(),
            "http://127.0.0.1:6007/api/sites"
        );
        let prefixed = Url::parse("https://host/goup").unwrap();
        assert_eq!(
            endpoint(&prefixed, "/api/logfiles?start=2024-01-01").unwrap().as_str(),
            "https://host/goup/api/logfiles?start=2024-01-01"
        );
    }

    #[test]
    fn unreachable_server_reports_transport_error() {
        let base = Url::parse("http://127.0.0.1:9").unwrap();
        let mut client = HttpClient::new(base, Duration::from_millis(200)).unwrap();
        client.send(
            Ticket {
                generation: 1,
                key: "sites".into(),
                owner: None,
            },
            Request::get("/api/sites"),
        );
        let mut deliveries = Vec::new();
        for _ in 0..100 {
            deliveries.extend(client.poll());
            if !deliveries.is_empty() {
                break;
            }
            thread::sleep(Duration::from_millis(20));
        }
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].ticket.key, "sites");
        assert!(matches!(deliveries[0].result, Err(ApiError::Transport(_))));
    }
}
