use indoc::formatdoc;
use serde_json::Value;

use super::{View, ViewContext, display_value};
use crate::api::{Payload, Request};
use crate::error::{ApiError, ViewError};
use crate::search;
use crate::surface::escape;

const SEARCH_TARGETS: &str = ".border-b";

const METRIC_ROWS: &[(&str, &str)] = &[
    ("Requests Total", "requests_total"),
    ("Average Latency (ms)", "latency_avg_ms"),
    ("CPU Usage (%)", "cpu_usage"),
    ("RAM Usage (MB)", "ram_usage_mb"),
];

#[derive(Debug, Default)]
pub struct MetricsView {
    metrics: Option<Value>,
    log_weight: Option<Value>,
    plugin_usage: Option<Value>,
    failed: bool,
}

impl View for MetricsView {
    fn title(&self) -> &'static str {
        "Metrics"
    }

    fn render(&mut self, cx: &mut ViewContext<'_>) -> Result<(), ViewError> {
        *self = Self::default();
        cx.mount("<div class=\"p-6\"><p class=\"text-gray-500\">Loading metrics…</p></div>")?;
        cx.fetch("metrics", Request::get("/api/metrics"));
        cx.fetch("logweight", Request::get("/api/logweight"));
        cx.fetch("pluginusage", Request::get("/api/pluginusage"));
        Ok(())
    }

    fn on_response(
        &mut self,
        key: &str,
        result: Result<Payload, ApiError>,
        cx: &mut ViewContext<'_>,
    ) -> Result<(), ViewError> {
        if self.failed {
            return Ok(());
        }
        let value = match result.and_then(Payload::into_json) {
            Ok(value) => value,
            Err(err) => {
                self.failed = true;
                return cx.show_error("metrics", &err);
            }
        };
        match key {
            "metrics" => self.metrics = Some(value),
            "logweight" => self.log_weight = Some(value),
            "pluginusage" => self.plugin_usage = Some(value),
            _ => return Ok(()),
        }
        let (Some(metrics), Some(log_weight), Some(usage)) =
            (&self.metrics, &self.log_weight, &self.plugin_usage)
        else {
            return Ok(());
        };

        let metric_rows: String = METRIC_ROWS
            .iter()
            .map(|(label, key)| row(label, &display_value(metrics.get(*key))))
            .collect();
        let usage_rows: String = match usage {
            Value::Object(map) if !map.is_empty() => map
                .iter()
                .map(|(plugin, count)| row(plugin, &display_value(Some(count))))
                .collect(),
            _ => "<p class=\"text-sm text-gray-400\">No plugin usage recorded.</p>".to_string(),
        };
        let markup = formatdoc! {r#"
            <div class="p-6 space-y-6">
              <h1 class="text-2xl font-bold">Metrics</h1>
              <div class="bg-white rounded-xl p-4">{metric_rows}</div>
              <div class="bg-white rounded-xl p-4">{log_row}</div>
              <div class="bg-white rounded-xl p-4">
                <h2 class="text-lg font-semibold">Plugin usage</h2>
                {usage_rows}
              </div>
            </div>
            "#,
            metric_rows = metric_rows,
            log_row = row("Log Weight (bytes)", &display_value(log_weight.get("log_weight_bytes"))),
            usage_rows = usage_rows,
        };
        cx.mount(&markup)?;
        cx.install_search(|surface, term| search::highlight(surface, SEARCH_TARGETS, term));
        Ok(())
    }
}

fn row(label: &str, value: &str) -> String {
    format!(
        "<div class=\"border-b flex justify-between py-2\"><span>{}</span> <span class=\"font-mono\">{}</span></div>",
        escape(label),
        escape(value)
    )
}
