//! Page-view beacon.
//!
//! The original surface for this is a tracking script evaluated by the host
//! page; a Rust client reproduces the observable effects instead: the
//! fixed-order directive pushes land in a process-wide append-only queue
//! (initialized once, never torn down), and a single fire-and-forget hit goes
//! to the collector's tracking endpoint. Nothing is awaited and no failure is
//! surfaced; collector errors exist only at debug log level.

use std::sync::{Mutex, OnceLock};

use crate::http::Client;

/// The directive schema, in the order they are pushed for a page view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerDirective {
    TrackPageView,
    EnableLinkTracking,
    SetTrackerUrl(String),
    SetSiteId(String),
}

/// Collector settings, fixed at build time like the backend endpoint.
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    pub tracker_url: String,
    pub site_id: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            tracker_url: option_env!("STREAMS_TRACKER_URL")
                .unwrap_or("https://rumalune.com/gga")
                .to_owned(),
            site_id: option_env!("STREAMS_SITE_ID").unwrap_or("2").to_owned(),
        }
    }
}

static DIRECTIVES: OnceLock<Mutex<Vec<TrackerDirective>>> = OnceLock::new();

fn directive_queue() -> &'static Mutex<Vec<TrackerDirective>> {
    DIRECTIVES.get_or_init(|| Mutex::new(Vec::new()))
}

fn push_all(directives: impl IntoIterator<Item = TrackerDirective>) {
    match directive_queue().lock() {
        Ok(mut guard) => guard.extend(directives),
        Err(poisoned) => poisoned.into_inner().extend(directives),
    }
}

/// Snapshot of everything pushed so far, oldest first.
pub fn directives() -> Vec<TrackerDirective> {
    match directive_queue().lock() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Record one page view: append the four directives in fixed order, then
/// ping the collector without waiting for it.
pub fn track_page_view(config: &AnalyticsConfig) {
    push_all([
        TrackerDirective::TrackPageView,
        TrackerDirective::EnableLinkTracking,
        TrackerDirective::SetTrackerUrl(format!("{}/matomo.php", config.tracker_url)),
        TrackerDirective::SetSiteId(config.site_id.clone()),
    ]);

    let ping = format!(
        "{}/matomo.php?idsite={}&rec=1",
        config.tracker_url, config.site_id
    );
    spawn_detached(async move {
        match Client::get(&ping).send().await {
            Ok(response) => log::debug!("analytics ping answered {}", response.status),
            Err(err) => log::debug!("analytics ping failed: {err}"),
        }
    });
}

fn spawn_detached(fut: impl std::future::Future<Output = ()> + Send + 'static) {
    #[cfg(not(target_arch = "wasm32"))]
    {
        // No runtime (plain unit tests): the directives still land in the
        // queue, only the ping is skipped.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(fut);
            }
            Err(_) => log::debug!("analytics ping skipped: no async runtime"),
        }
    }

    #[cfg(target_arch = "wasm32")]
    wasm_bindgen_futures::spawn_local(fut);
}
