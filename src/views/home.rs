use std::collections::BTreeMap;

use indoc::formatdoc;
use serde_json::Value;

use super::{View, ViewContext, display_value, expect_array};
use crate::api::{Payload, Request};
use crate::error::{ApiError, ViewError};
use crate::search;
use crate::surface::escape;

const SEARCH_TARGETS: &str = ".text-lg.font-semibold.mb-2, .space-y-2.text-sm.text-gray-600 li, .bg-white.rounded-xl.shadow span";

/// Landing page: site and virtual-host counts, total log weight and the
/// headline server metrics.
#[derive(Debug, Default)]
pub struct HomeView {
    sites: Option<Vec<Value>>,
    log_weight: Option<Value>,
    metrics: Option<Value>,
    failed: bool,
}

impl View for HomeView {
    fn title(&self) -> &'static str {
        "Home"
    }

    fn render(&mut self, cx: &mut ViewContext<'_>) -> Result<(), ViewError> {
        *self = Self::default();
        cx.mount("<div class=\"p-6\"><p class=\"text-gray-500\">Loading overview…</p></div>")?;
        cx.fetch("sites", Request::get("/api/sites"));
        cx.fetch("logweight", Request::get("/api/logweight"));
        cx.fetch("metrics", Request::get("/api/metrics"));
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
                return cx.show_error("the overview", &err);
            }
        };
        match key {
            "sites" => self.sites = Some(expect_array(value, "sites")?),
            "logweight" => self.log_weight = Some(value),
            "metrics" => self.metrics = Some(value),
            _ => return Ok(()),
        }
        let (Some(sites), Some(log_weight), Some(metrics)) =
            (&self.sites, &self.log_weight, &self.metrics)
        else {
            return Ok(());
        };

        let site_items: String = sites
            .iter()
            .map(|site| {
                format!(
                    "<li>{} (port {})</li>",
                    escape(&display_value(site.get("domain"))),
                    escape(&display_value(site.get("port")))
                )
            })
            .collect();
        let markup = formatdoc! {r#"
            <div class="p-6 space-y-6">
              <h1 class="text-2xl font-bold">Overview</h1>
              <div class="bg-white rounded-xl shadow p-4">
                <span>Sites: {sites_count}</span>
                <span>Virtual hosts: {vhosts}</span>
                <span>Log weight: {weight} bytes</span>
              </div>
              <div class="bg-white rounded-xl p-4">
                <h2 class="text-lg font-semibold mb-2">Server metrics</h2>
                <ul class="space-y-2 text-sm text-gray-600">
                  <li>Requests total: {requests}</li>
                  <li>Average latency: {latency} ms</li>
                  <li>CPU usage: {cpu}%</li>
                  <li>RAM usage: {ram} MB</li>
                </ul>
              </div>
              <div class="bg-white rounded-xl p-4">
                <h2 class="text-lg font-semibold mb-2">Sites</h2>
                <ul class="space-y-2 text-sm text-gray-600">{site_items}</ul>
              </div>
            </div>
            "#,
            site_items = site_items,
            sites_count = sites.len(),
            vhosts = vhost_count(sites),
            weight = escape(&display_value(log_weight.get("log_weight_bytes"))),
            requests = escape(&display_value(metrics.get("requests_total"))),
            latency = escape(&display_value(metrics.get("latency_avg_ms"))),
            cpu = escape(&display_value(metrics.get("cpu_usage"))),
            ram = escape(&display_value(metrics.get("ram_usage_mb"))),
        };
        cx.mount(&markup)?;
        cx.install_search(|surface, term| search::highlight(surface, SEARCH_TARGETS, term));
        Ok(())
    }
}

/// Number of ports shared by more than one site.
pub fn vhost_count(sites: &[Value]) -> usize {
    let mut per_port: BTreeMap<String, usize> = BTreeMap::new();
    for site in sites {
        *per_port.entry(display_value(site.get("port"))).or_default() += 1;
    }
    per_port.values().filter(|count| **count > 1).count()
}
