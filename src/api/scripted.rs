//! Offline client answering from canned responses. Backs `--demo` and the
//! test suite.

use std::collections::{BTreeMap, VecDeque};

use serde_json::{Value, json};

use super::{ApiClient, ApiError, Delivery, Method, Payload, Request, Ticket};

#[derive(Debug, Default)]
pub struct ScriptedClient {
    responses: BTreeMap<(Method, String), Result<Payload, ApiError>>,
    sent: Vec<(Ticket, Request)>,
    ready: VecDeque<Delivery>,
    parked: Vec<Delivery>,
    holding: bool,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers every `method path` request with `result`. `path` may include a
    /// query string; requests with a query fall back to the bare path.
    pub fn respond(
        &mut self,
        method: Method,
        path: &str,
        result: Result<Payload, ApiError>,
    ) -> &mut Self {
        self.responses.insert((method, path.to_string()), result);
        self
    }

    pub fn respond_json(&mut self, method: Method, path: &str, value: Value) -> &mut Self {
        self.respond(method, path, Ok(Payload::Json(value)))
    }

    pub fn respond_text(&mut self, method: Method, path: &str, text: &str) -> &mut Self {
        self.respond(method, path, Ok(Payload::Text(text.to_string())))
    }

    /// Parks deliveries until `release`, simulating slow responses.
    pub fn hold(&mut self) {
        self.holding = true;
    }

    pub fn release(&mut self) {
        self.holding = false;
        self.ready.extend(self.parked.drain(..));
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> &[(Ticket, Request)] {
        &self.sent
    }

    pub fn sent_paths(&self) -> Vec<String> {
        self.sent
            .iter()
            .map(|(_, request)| format!("{} {}", request.method, request.path))
            .collect()
    }

    fn lookup(&self, request: &Request) -> Result<Payload, ApiError> {
        let bare = request
            .path
            .split_once('?')
            .map_or(request.path.as_str(), |(path, _)| path);
        self.responses
            .get(&(request.method, request.path.clone()))
            .or_else(|| self.responses.get(&(request.method, bare.to_string())))
            .cloned()
            .unwrap_or_else(|| {
                Err(ApiError::Unscripted {
                    method: request.method.to_string(),
                    path: request.path.clone(),
                })
            })
    }

    /// Client preloaded with a small sample server.
    pub fn demo() -> Self {
        let mut client = Self::new();
        let sites = json!([
            {
                "domain": "example.com",
                "port": 8080,
                "root_directory": "/var/www/example",
                "custom_headers": {"X-Frame-Options": "DENY"},
                "proxy_pass": "",
                "ssl": {"enabled": false, "certificate": "", "key": ""},
                "request_timeout": 60
            },
            {
                "domain": "blog.example.com",
                "port": 8080,
                "root_directory": "/var/www/blog",
                "custom_headers": {},
                "proxy_pass": "",
                "ssl": {"enabled": true, "certificate": "/etc/ssl/blog.pem", "key": "/etc/ssl/blog.key"},
                "request_timeout": 30
            },
            {
                "domain": "api.internal",
                "port": 9000,
                "root_directory": "",
                "custom_headers": {},
                "proxy_pass": "http://127.0.0.1:3000",
                "ssl": {"enabled": false, "certificate": "", "key": ""},
                "request_timeout": 10
            }
        ]);
        if let Value::Array(entries) = &sites {
            for site in entries {
                if let Some(domain) = site.get("domain").and_then(Value::as_str) {
                    let path = format!("/api/sites/{domain}");
                    client.respond_json(Method::Get, &path, site.clone());
                    client.respond_json(Method::Put, &path, json!({"status": "updated"}));
                    client.respond_json(Method::Delete, &path, json!({"status": "deleted"}));
                }
            }
        }
        client
            .respond_json(Method::Get, "/api/sites", sites)
            .respond_json(
                Method::Get,
                "/api/metrics",
                json!({
                    "requests_total": 18234,
                    "latency_avg_ms": 12.4,
                    "cpu_usage": 3.5,
                    "ram_usage_mb": 41.2
                }),
            )
            .respond_json(Method::Get, "/api/logweight", json!({"log_weight_bytes": 734003}))
            .respond_json(
                Method::Get,
                "/api/pluginusage",
                json!({"AuthPlugin": 1200, "PHPPlugin": 860, "NodeJSPlugin": 0}),
            )
            .respond_json(
                Method::Get,
                "/api/plugins",
                json!([
                    {"name": "AuthPlugin", "enabled": true, "description": "Basic authentication for protected paths"},
                    {"name": "PHPPlugin", "enabled": true, "description": "Serves PHP through php-fpm"},
                    {"name": "NodeJSPlugin", "enabled": false, "description": "Runs Node.js apps behind the proxy"}
                ]),
            )
            .respond_json(
                Method::Get,
                "/api/config",
                json!({
                    "enable_api": true,
                    "api_port": 6007,
                    "dashboard_port": 6008,
                    "enabled_plugins": ["AuthPlugin", "PHPPlugin"]
                }),
            )
            .respond_json(
                Method::Put,
                "/api/config",
                json!({
                    "enable_api": true,
                    "api_port": 6007,
                    "dashboard_port": 6008,
                    "enabled_plugins": ["AuthPlugin", "PHPPlugin"]
                }),
            )
            .respond_json(
                Method::Get,
                "/api/logfiles",
                json!([
                    {"domain": "example.com", "year": 2024, "month": 5, "day": 2, "file_name": "example.com/2024/05/02.log", "size_bytes": 412, "mod_time_unix": 1714608000},
                    {"domain": "blog.example.com", "plugin": "PHPPlugin", "year": 2024, "month": 5, "day": 2, "file_name": "blog.example.com/PHPPlugin/2024/05/02.log", "size_bytes": 96, "mod_time_unix": 1714608000},
                    {"domain": "api.internal", "year": 2024, "month": 5, "day": 1, "file_name": "api.internal/2024/05/01.log", "size_bytes": 0, "mod_time_unix": 1714521600}
                ]),
            )
            .respond_text(
                Method::Get,
                "/api/logfiles/example.com%2F2024%2F05%2F02.log",
                concat!(
                    "{\"level\":\"info\",\"time\":\"2024-05-02T10:00:01Z\",\"message\":\"GET /index.html\",\"status\":200}\n",
                    "{\"level\":\"warn\",\"time\":\"2024-05-02T10:00:07Z\",\"message\":\"slow upstream\",\"latency_ms\":912}\n",
                    "{\"level\":\"error\",\"time\":\"2024-05-02T10:01:13Z\",\"message\":\"GET /missing\",\"status\":404}\n"
                ),
            )
            .respond_text(
                Method::Get,
                "/api/logfiles/blog.example.com%2FPHPPlugin%2F2024%2F05%2F02.log",
                "php-fpm: pool www started\nphp-fpm: <notice> ready to handle connections\n",
            )
            .respond_json(
                Method::Post,
                "/api/plugins/AuthPlugin/toggle",
                json!({"status": "toggled"}),
            )
            .respond_json(
                Method::Post,
                "/api/plugins/PHPPlugin/toggle",
                json!({"status": "toggled"}),
            )
            .respond_json(
                Method::Post,
                "/api/plugins/NodeJSPlugin/toggle",
                json!({"status": "toggled"}),
            )
            .respond_json(
                Method::Post,
                "/api/tools/cleanuplogs",
                json!({"status": "ok", "message": "Logs cleaned and backup saved"}),
            )
            .respond_json(Method::Post, "/api/restart", json!({"status": "restarting"}));
        client
    }
}

impl ApiClient for ScriptedClient {
    fn send(&mut self, ticket: Ticket, request: Request) {
        tracing::debug!(method = %request.method, path = %request.path, "scripted request");
        let delivery = Delivery {
            ticket: ticket.clone(),
            result: self.lookup(&request),
        };
        self.sent.push((ticket, request));
        if self.holding {
            self.parked.push(delivery);
        } else {
            self.ready.push_back(delivery);
        }
    }

    fn poll(&mut self) -> Vec<Delivery> {
        self.ready.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(key: &str) -> Ticket {
        Ticket {
            generation: 1,
            key: key.into(),
            owner: None,
        }
    }

    #[test]
    fn query_falls_back_to_bare_path() {
        let mut client = ScriptedClient::new();
        client.respond_json(Method::Get, "/api/logfiles", json!([]));
        client.send(ticket("files"), Request::get("/api/logfiles?start=2024-01-01"));
        let delivered = client.poll();
        assert_eq!(delivered[0].result, Ok(Payload::Json(json!([]))));
    }

    #[test]
    fn unscripted_requests_fail() {
        let mut client = ScriptedClient::new();
        client.send(ticket("x"), Request::delete("/api/nothing"));
        assert_eq!(
            client.poll()[0].result,
            Err(ApiError::Unscripted {
                method: "DELETE".into(),
                path: "/api/nothing".into()
            })
        );
    }

    #[test]
    fn hold_parks_until_release() {
        let mut client = ScriptedClient::demo();
        client.hold();
        client.send(ticket("sites"), Request::get("/api/sites"));
        assert!(client.poll().is_empty());
        client.release();
        assert_eq!(client.poll().len(), 1);
        assert_eq!(client.sent_paths(), vec!["GET /api/sites".to_string()]);
    }
}
