//! Dashboard Updater
//!
//! Owns the page, the chart registry and the series source, and runs the
//! poll/update/render cycle:
//!
//! 1. every indicator is fetched concurrently; the join waits for all of
//!    them and one failure never cancels another
//! 2. a well-formed array updates the indicator's chart, preview tables and
//!    download link; anything else leaves them exactly as they were
//! 3. the last-updated stamp is refreshed once all indicators settle
//!
//! Scheduled cycles run one after another from [`Updater::start`]. A manual
//! [`Updater::update`] may overlap a scheduled cycle; every write is a
//! whole-element replacement, so the later write wins.

use chrono::{DateTime, Local, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, RwLock};
use tokio::time::MissedTickBehavior;

use crate::export::csv_data_uri;
use crate::indicators::{IndicatorSpec, INDICATORS, LAST_UPDATED_ID};
use crate::page::{render_html, Chart, ChartRegistry, Page};
use crate::seed::SeedData;
use crate::series::Series;
use crate::source::SeriesSource;

/// Format of the last-updated stamp (local time)
pub const LAST_UPDATED_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// Shortest accepted polling interval
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Configuration for the updater
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    /// Time between scheduled cycles
    pub interval: Duration,
    /// Preview table cap for live cycles
    pub live_row_cap: usize,
    /// Preview table cap for the seed render
    pub seed_row_cap: usize,
    /// Write the rendered page here after every cycle
    pub html_path: Option<PathBuf>,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            live_row_cap: 200,
            seed_row_cap: 100,
            html_path: None,
        }
    }
}

/// Outcome of one update cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    /// Sequence number, starting at 1
    pub cycle: u64,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// Indicators whose visuals were refreshed
    pub updated: Vec<String>,
    /// Indicators that returned no data this cycle
    pub skipped: Vec<String>,
    /// Text written to the last-updated element
    pub last_updated: String,
}

/// Snapshot of the updater for status reporting
#[derive(Debug, Clone, Serialize)]
pub struct UpdaterStatus {
    pub running: bool,
    pub cycles: u64,
    pub charts: Vec<String>,
    pub last_cycle: Option<CycleReport>,
}

#[derive(Debug, Default)]
struct UpdaterState {
    cycles: u64,
    last_cycle: Option<CycleReport>,
}

/// Polls the series source and keeps the dashboard page current
pub struct Updater {
    source: Arc<dyn SeriesSource>,
    indicators: Vec<IndicatorSpec>,
    page: RwLock<Page>,
    charts: RwLock<ChartRegistry>,
    state: RwLock<UpdaterState>,
    running: AtomicBool,
    stop_signal: Notify,
    config: UpdaterConfig,
}

impl Updater {
    /// Create an updater over the standard dashboard page
    pub fn new(source: Arc<dyn SeriesSource>, config: UpdaterConfig) -> Self {
        Self::with_page(source, config, Page::dashboard())
    }

    /// Create an updater over a custom page
    pub fn with_page(source: Arc<dyn SeriesSource>, config: UpdaterConfig, page: Page) -> Self {
        Self {
            source,
            indicators: INDICATORS.to_vec(),
            page: RwLock::new(page),
            charts: RwLock::new(ChartRegistry::new()),
            state: RwLock::new(UpdaterState::default()),
            running: AtomicBool::new(false),
            stop_signal: Notify::new(),
            config,
        }
    }

    /// Render fallback series before any network cycle.
    ///
    /// Returns how many indicators were rendered.
    pub async fn render_seed(&self, seed: &SeedData) -> usize {
        let mut rendered = 0;

        for spec in &self.indicators {
            if let Some(series) = seed.get(spec.key) {
                self.apply(spec, series, self.config.seed_row_cap).await;
                rendered += 1;
            }
        }

        if rendered > 0 {
            tracing::info!(indicators = rendered, "Rendered seed data");
        }
        rendered
    }

    /// Run one full update cycle.
    ///
    /// Never fails: indicators without data are skipped and reported.
    pub async fn update(&self) -> CycleReport {
        let started_at = Utc::now();
        let start = std::time::Instant::now();

        let outcomes = join_all(
            self.indicators
                .iter()
                .map(|spec| async move { (spec.key, self.update_indicator(spec).await) }),
        )
        .await;

        let mut updated = Vec::new();
        let mut skipped = Vec::new();
        for (key, ok) in outcomes {
            if ok {
                updated.push(key.to_string());
            } else {
                skipped.push(key.to_string());
            }
        }

        let last_updated = Local::now().format(LAST_UPDATED_FORMAT).to_string();
        self.page
            .write()
            .await
            .set_text(LAST_UPDATED_ID, last_updated.clone());

        let report = {
            let mut state = self.state.write().await;
            if state.cycles == 0 {
                for key in &skipped {
                    tracing::warn!(indicator = %key, "Initial fetch returned no data");
                }
            }
            state.cycles += 1;

            let report = CycleReport {
                cycle: state.cycles,
                started_at,
                duration_ms: start.elapsed().as_millis() as u64,
                updated,
                skipped,
                last_updated,
            };
            state.last_cycle = Some(report.clone());
            report
        };

        tracing::info!(
            cycle = report.cycle,
            updated = report.updated.len(),
            skipped = report.skipped.len(),
            duration_ms = report.duration_ms,
            "Update cycle finished"
        );

        self.write_html().await;

        report
    }

    /// Fetch one indicator and apply it. Returns whether anything changed.
    async fn update_indicator(&self, spec: &IndicatorSpec) -> bool {
        let path = spec.path_and_query();

        let Some(body) = self.source.fetch(&path).await else {
            tracing::debug!(indicator = %spec.key, source = %self.source.name(), "No data");
            return false;
        };

        let Some(series) = Series::from_json(&body) else {
            tracing::debug!(indicator = %spec.key, "Response is not an array, skipping");
            return false;
        };

        self.apply(spec, &series, self.config.live_row_cap).await;
        true
    }

    /// Update the chart, tables and download link of one indicator
    async fn apply(&self, spec: &IndicatorSpec, series: &Series, max_rows: usize) {
        let mut page = self.page.write().await;
        let mut charts = self.charts.write().await;

        if page.has_canvas(spec.chart_id) {
            charts.make_or_update(spec.chart_id, spec.label, spec.color, series);
        }

        let rows = series.rows();
        for table_id in spec.table_ids {
            page.render_table(table_id, &spec.header, &rows, max_rows);
        }

        match csv_data_uri(&spec.header, &rows) {
            Ok(uri) => {
                page.set_href(spec.download_id, uri);
            }
            Err(e) => {
                tracing::warn!(indicator = %spec.key, error = %e, "Failed to build CSV link");
            }
        }

        tracing::debug!(indicator = %spec.key, points = series.len(), "Indicator updated");
    }

    async fn write_html(&self) {
        let Some(path) = &self.config.html_path else {
            return;
        };

        let html = self.html().await;
        if let Err(e) = tokio::fs::write(path, html).await {
            tracing::warn!(path = ?path, error = %e, "Failed to write dashboard HTML");
        }
    }

    /// Render the current page as HTML
    pub async fn html(&self) -> String {
        let page = self.page.read().await;
        let charts = self.charts.read().await;
        render_html(&page, &charts)
    }

    /// Copy of the current page
    pub async fn page(&self) -> Page {
        self.page.read().await.clone()
    }

    /// Copy of one chart
    pub async fn chart(&self, id: &str) -> Option<Chart> {
        self.charts.read().await.get(id).cloned()
    }

    pub async fn chart_count(&self) -> usize {
        self.charts.read().await.len()
    }

    pub async fn status(&self) -> UpdaterStatus {
        let state = self.state.read().await;
        UpdaterStatus {
            running: self.running.load(Ordering::SeqCst),
            cycles: state.cycles,
            charts: self.charts.read().await.ids(),
            last_cycle: state.last_cycle.clone(),
        }
    }

    /// Start polling: one cycle immediately, then one per interval.
    ///
    /// The loop exits once [`Updater::stop`] is called, either right away
    /// while waiting for the next tick or after the cycle in progress.
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        self.running.store(true, Ordering::SeqCst);
        let period = self.config.interval.max(MIN_INTERVAL);
        let updater = self.clone();

        tokio::spawn(async move {
            tracing::info!(
                interval_ms = period.as_millis() as u64,
                indicators = updater.indicators.len(),
                "Starting poller"
            );

            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            while updater.running.load(Ordering::SeqCst) {
                tokio::select! {
                    _ = interval.tick() => {}
                    // A leftover wake-up from an earlier stop is ignored
                    _ = updater.stop_signal.notified() => continue,
                }

                if !updater.running.load(Ordering::SeqCst) {
                    break;
                }

                updater.update().await;
            }

            tracing::info!("Poller stopped");
        })
    }

    /// Stop the polling loop; a cycle already in progress is finished first
    pub async fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.stop_signal.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::decode_csv_data_uri;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Serves canned bodies by request path; unknown paths give no data
    #[derive(Default)]
    struct StubSource {
        bodies: Mutex<HashMap<String, Value>>,
        delays: HashMap<String, Duration>,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn set(&self, path: &str, body: Value) {
            self.bodies.lock().unwrap().insert(path.to_string(), body);
        }

        fn clear(&self, path: &str) {
            self.bodies.lock().unwrap().remove(path);
        }
    }

    #[async_trait]
    impl SeriesSource for StubSource {
        fn name(&self) -> &str {
            "stub"
        }

        async fn fetch(&self, path_and_query: &str) -> Option<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delays.get(path_and_query) {
                tokio::time::sleep(*delay).await;
            }
            let body = self.bodies.lock().unwrap().get(path_and_query).cloned();
            match body {
                Some(Value::Null) | None => None,
                other => other,
            }
        }
    }

    const SELIC: &str = "/selic?n=720";

    fn selic_body() -> Value {
        json!([
            {"date": "2024-01-01", "value": "11.25"},
            {"date": "2024-02-01", "value": "11.00"},
        ])
    }

    fn updater(source: Arc<StubSource>) -> Updater {
        Updater::new(source, UpdaterConfig::default())
    }

    #[tokio::test]
    async fn test_selic_end_to_end() {
        let source = Arc::new(StubSource::default());
        source.set(SELIC, selic_body());
        let updater = updater(source);

        let report = updater.update().await;
        assert_eq!(report.updated, vec!["selic"]);
        assert_eq!(report.skipped.len(), 4);

        let chart = updater.chart("chart-selic").await.unwrap();
        assert_eq!(chart.labels, vec!["2024-01-01", "2024-02-01"]);
        assert_eq!(chart.values, vec![11.25, 11.0]);

        let page = updater.page().await;
        for table_id in ["table-selic", "table-bcb"] {
            let table = page.table(table_id).unwrap();
            assert_eq!(table.headers, vec!["date", "selic"]);
            assert_eq!(table.shown, 2);
            assert_eq!(table.total, 2);
        }

        let csv = decode_csv_data_uri(page.href("download-selic").unwrap()).unwrap();
        assert_eq!(csv, "date,selic\n2024-01-01,11.25\n2024-02-01,11");
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_visuals_untouched() {
        let source = Arc::new(StubSource::default());
        source.set(SELIC, selic_body());
        let updater = updater(source.clone());
        updater.update().await;

        let page_before = updater.page().await;
        let chart_before = updater.chart("chart-selic").await.unwrap();

        // Timeout/HTTP error surface as a null body
        source.set(SELIC, Value::Null);
        let report = updater.update().await;
        assert!(report.skipped.contains(&"selic".to_string()));

        let page_after = updater.page().await;
        assert_eq!(updater.chart("chart-selic").await.unwrap(), chart_before);
        for id in ["table-selic", "table-bcb"] {
            assert_eq!(page_after.table(id), page_before.table(id));
        }
        assert_eq!(page_after.href("download-selic"), page_before.href("download-selic"));
    }

    #[tokio::test]
    async fn test_non_array_body_is_skipped() {
        let source = Arc::new(StubSource::default());
        source.set(SELIC, json!({"error": "upstream down"}));
        let updater = updater(source);

        let report = updater.update().await;
        assert!(report.updated.is_empty());
        assert!(updater.chart("chart-selic").await.is_none());
        assert!(updater.page().await.table("table-selic").is_none());
    }

    #[tokio::test]
    async fn test_chart_created_once_and_replaced() {
        let source = Arc::new(StubSource::default());
        source.set(SELIC, selic_body());
        let updater = updater(source.clone());
        updater.update().await;

        source.set(SELIC, json!([{"date": "2024-03-01", "value": 10.75}]));
        updater.update().await;

        assert_eq!(updater.chart_count().await, 1);
        let chart = updater.chart("chart-selic").await.unwrap();
        assert_eq!(chart.labels, vec!["2024-03-01"]);
        assert_eq!(chart.values, vec![10.75]);
        assert_eq!(chart.redraws, 1);
    }

    #[tokio::test]
    async fn test_live_tables_are_capped() {
        let body: Vec<Value> = (0..720)
            .map(|i| json!({"date": format!("d{}", i), "value": i}))
            .collect();
        let source = Arc::new(StubSource::default());
        source.set(SELIC, Value::Array(body));
        let updater = updater(source);
        updater.update().await;

        let page = updater.page().await;
        let table = page.table("table-selic").unwrap();
        assert_eq!(table.shown, 200);
        assert_eq!(table.total, 720);

        // Chart and CSV keep the full series
        assert_eq!(updater.chart("chart-selic").await.unwrap().values.len(), 720);
        let csv = decode_csv_data_uri(page.href("download-selic").unwrap()).unwrap();
        assert_eq!(csv.lines().count(), 721);
    }

    #[tokio::test]
    async fn test_seed_render_uses_seed_cap() {
        let mut seed = SeedData::empty();
        seed.insert(
            "sidra",
            Series::new(
                (0..150).map(|i| format!("2010-{}", i)).collect(),
                (0..150).map(|i| i as f64).collect(),
            ),
        );

        let updater = updater(Arc::new(StubSource::default()));
        assert_eq!(updater.render_seed(&seed).await, 1);

        let page = updater.page().await;
        for id in ["table-ipca", "table-sidra"] {
            let table = page.table(id).unwrap();
            assert_eq!(table.shown, 100);
            assert_eq!(table.total, 150);
        }
        assert!(page.href("download-sidra").is_some());
        assert_eq!(updater.chart("chart-sidra").await.unwrap().values.len(), 150);
    }

    #[tokio::test]
    async fn test_seed_then_live_keeps_single_chart() {
        let mut seed = SeedData::empty();
        seed.insert("selic", Series::new(vec!["2023-12-01".into()], vec![11.75]));

        let source = Arc::new(StubSource::default());
        source.set(SELIC, selic_body());
        let updater = updater(source);

        updater.render_seed(&seed).await;
        updater.update().await;

        assert_eq!(updater.chart_count().await, 1);
        let chart = updater.chart("chart-selic").await.unwrap();
        assert_eq!(chart.values, vec![11.25, 11.0]);
    }

    #[tokio::test]
    async fn test_missing_elements_are_tolerated() {
        let source = Arc::new(StubSource::default());
        source.set(SELIC, selic_body());
        let page = Page::new().with_table("table-bcb");
        let updater = Updater::with_page(source, UpdaterConfig::default(), page);

        let report = updater.update().await;
        assert_eq!(report.updated, vec!["selic"]);
        assert!(updater.chart("chart-selic").await.is_none());

        let page = updater.page().await;
        assert_eq!(page.table("table-bcb").unwrap().total, 2);
        assert!(page.href("download-selic").is_none());
        assert_eq!(page.len(), 1);
    }

    #[tokio::test]
    async fn test_last_updated_stamped_even_when_everything_fails() {
        let source = Arc::new(StubSource::default());
        let updater = updater(source.clone());

        let report = updater.update().await;
        assert!(report.updated.is_empty());
        assert_eq!(source.calls.load(Ordering::SeqCst), INDICATORS.len());

        let page = updater.page().await;
        let stamp = page.text(LAST_UPDATED_ID).unwrap();
        assert!(!stamp.is_empty());
        assert_eq!(stamp, report.last_updated);
    }

    #[tokio::test]
    async fn test_slow_indicator_does_not_block_others() {
        let mut delays = HashMap::new();
        delays.insert("/focus?n=240".to_string(), Duration::from_millis(50));
        let source = Arc::new(StubSource {
            delays,
            ..Default::default()
        });
        source.set(SELIC, selic_body());
        source.set("/focus?n=240", json!([{"date": "2024-01-01", "value": 3.9}]));
        let updater = updater(source.clone());

        let report = updater.update().await;
        assert_eq!(report.updated.len(), 2);
        assert!(report.updated.contains(&"selic".to_string()));
        assert!(report.updated.contains(&"focus".to_string()));

        source.clear("/focus?n=240");
        let report = updater.update().await;
        assert_eq!(report.updated, vec!["selic"]);
        assert_eq!(updater.chart("chart-focus").await.unwrap().values, vec![3.9]);
    }

    #[tokio::test]
    async fn test_overlapping_cycles_keep_one_chart() {
        let source = Arc::new(StubSource::default());
        source.set(SELIC, selic_body());
        let updater = updater(source);

        let (a, b) = tokio::join!(updater.update(), updater.update());
        assert_eq!(a.updated, vec!["selic"]);
        assert_eq!(b.updated, vec!["selic"]);
        assert_ne!(a.cycle, b.cycle);
        assert_eq!(updater.chart_count().await, 1);
        assert_eq!(updater.status().await.cycles, 2);
    }

    #[tokio::test]
    async fn test_writes_html_after_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.html");

        let source = Arc::new(StubSource::default());
        source.set(SELIC, selic_body());
        let config = UpdaterConfig {
            html_path: Some(path.clone()),
            ..Default::default()
        };
        let updater = Updater::new(source, config);
        updater.update().await;

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("<canvas id=\"chart-selic\"></canvas>"));
        assert!(html.contains("Mostrando 2 de 2 linhas."));
    }

    #[tokio::test]
    async fn test_start_runs_immediately_and_stops() {
        let source = Arc::new(StubSource::default());
        source.set(SELIC, selic_body());
        let config = UpdaterConfig {
            interval: Duration::from_secs(3600),
            ..Default::default()
        };
        let updater = Arc::new(Updater::new(source, config));

        let handle = Arc::clone(&updater).start();
        for _ in 0..100 {
            if updater.status().await.cycles > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let status = updater.status().await;
        assert_eq!(status.cycles, 1);
        assert!(status.running);
        assert_eq!(status.charts, vec!["chart-selic"]);

        // Stopping while waiting on the hour-long tick ends the loop at once
        updater.stop().await;
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("poller should exit promptly")
            .unwrap();

        let status = updater.status().await;
        assert!(!status.running);
        assert_eq!(status.cycles, 1);
    }

    #[tokio::test]
    async fn test_stop_before_first_cycle() {
        let source = Arc::new(StubSource::default());
        source.set(SELIC, selic_body());
        let config = UpdaterConfig {
            interval: Duration::from_millis(20),
            ..Default::default()
        };
        let updater = Arc::new(Updater::new(source, config));

        let handle = Arc::clone(&updater).start();
        updater.stop().await;

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("poller should exit promptly")
            .unwrap();

        let status = updater.status().await;
        assert!(!status.running);
        assert_eq!(status.cycles, 0);
    }

    #[tokio::test]
    async fn test_restart_after_stop_keeps_polling() {
        let source = Arc::new(StubSource::default());
        let config = UpdaterConfig {
            interval: Duration::from_millis(10),
            ..Default::default()
        };
        let updater = Arc::new(Updater::new(source, config));

        // Leaves a pending wake-up behind for the next loop
        updater.stop().await;

        let handle = Arc::clone(&updater).start();
        for _ in 0..200 {
            if updater.status().await.cycles >= 3 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(updater.status().await.cycles >= 3);

        updater.stop().await;
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("poller should exit promptly")
            .unwrap();
    }

    #[tokio::test]
    async fn test_zero_interval_is_clamped() {
        let source = Arc::new(StubSource::default());
        let config = UpdaterConfig {
            interval: Duration::ZERO,
            ..Default::default()
        };
        let updater = Arc::new(Updater::new(source, config));

        let handle = Arc::clone(&updater).start();
        for _ in 0..100 {
            if updater.status().await.cycles >= 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(updater.status().await.cycles >= 2);

        updater.stop().await;
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("poller should exit promptly")
            .unwrap();
    }
}
