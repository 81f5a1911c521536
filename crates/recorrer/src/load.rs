//! Concurrent load runner for the search funnel.
//!
//! Replays browser-like user journeys (homepage, header search, pagination,
//! filters, sort, auto-suggest, search-within-results) against a search
//! deployment, collects per-request timings, and produces percentile-based
//! latency reports.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Search results route
pub const SEARCH_PATH: &str = "/arama";
/// Auto-suggest route
pub const SUGGEST_PATH: &str = "/arama/tamamla";
/// Sort key for price ascending
pub const SORT_PRICE_ASCENDING: &str = "PRICE_LOW";

/// Queries the basic-search journey cycles through
pub const BASIC_QUERIES: [&str; 3] = ["laptop", "telefon", "kadın mont"];
/// Brand refinements applied to laptop searches
pub const LAPTOP_BRANDS: [&str; 3] = ["asus", "lenovo", "msi"];
/// Brand refinements applied to coat searches
pub const COAT_BRANDS: [&str; 3] = ["defacto", "koton", "lcw"];
/// Price windows, as (min, max) query values
pub const PRICE_RANGES: [(&str, &str); 3] =
    [("500", "1500"), ("15000", "40000"), ("20000", "50000")];
/// Prefix sequences the auto-suggest journeys type through
pub const SUGGEST_PREFIX_SETS: [[&str; 3]; 4] = [
    ["l", "la", "lap"],
    ["i", "ip", "iph"],
    ["p", "ps", "ps5"],
    ["k", "ka", "kad"],
];

fn owned_params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}

/// One HTTP request in a journey.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadStep {
    /// Report bucket this step's timings land in
    pub label: String,
    /// Path relative to the base URL
    pub path: String,
    /// Query parameters, encoded at request time
    pub params: Vec<(String, String)>,
}

impl LoadStep {
    /// Load the homepage
    #[must_use]
    pub fn homepage() -> Self {
        Self {
            label: "homepage".to_string(),
            path: "/".to_string(),
            params: Vec::new(),
        }
    }

    /// Header search for `query`
    #[must_use]
    pub fn search(search_path: &str, query: &str) -> Self {
        Self {
            label: "search".to_string(),
            path: search_path.to_string(),
            params: owned_params(&[("q", query)]),
        }
    }

    /// Open results page `page` of `query`, keeping `filters` active
    #[must_use]
    pub fn paginate(search_path: &str, query: &str, page: u32, filters: &[(&str, &str)]) -> Self {
        let page = page.to_string();
        let mut params = owned_params(&[("q", query), ("pg", page.as_str())]);
        params.extend(owned_params(filters));
        Self {
            label: "paginate".to_string(),
            path: search_path.to_string(),
            params,
        }
    }

    /// Search for `query` with `filters` applied
    #[must_use]
    pub fn filtered(search_path: &str, query: &str, filters: &[(&str, &str)]) -> Self {
        let mut params = owned_params(&[("q", query)]);
        params.extend(owned_params(filters));
        Self {
            label: "filter".to_string(),
            path: search_path.to_string(),
            params,
        }
    }

    /// Search for `query` with `filters` applied, ordered by `sort_key`
    #[must_use]
    pub fn sorted(
        search_path: &str,
        query: &str,
        filters: &[(&str, &str)],
        sort_key: &str,
    ) -> Self {
        let mut params = owned_params(&[("q", query), ("srt", sort_key)]);
        params.extend(owned_params(filters));
        Self {
            label: "sort".to_string(),
            path: search_path.to_string(),
            params,
        }
    }

    /// Ask for suggestions on a typed `prefix`
    #[must_use]
    pub fn suggest(suggest_path: &str, prefix: &str) -> Self {
        Self {
            label: "suggest".to_string(),
            path: suggest_path.to_string(),
            params: owned_params(&[("keyword", prefix)]),
        }
    }

    /// Refine the results of `base_query` with `refinement`
    #[must_use]
    pub fn within(search_path: &str, base_query: &str, refinement: &str) -> Self {
        Self {
            label: "search_within".to_string(),
            path: search_path.to_string(),
            params: owned_params(&[("q", base_query), ("iw", refinement)]),
        }
    }
}

/// A named user session: the steps one simulated user walks in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journey {
    /// Journey name used in reports
    pub name: String,
    /// Steps, issued in order
    pub steps: Vec<LoadStep>,
}

impl Journey {
    /// Build a journey from its steps
    pub fn new(name: impl Into<String>, steps: Vec<LoadStep>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }
}

/// The seven canonical funnel journeys on the default routes.
#[must_use]
pub fn default_journeys() -> Vec<Journey> {
    journeys_for(SEARCH_PATH, SUGGEST_PATH)
}

/// The seven canonical funnel journeys against custom routes.
///
/// Where the original sessions picked brands, price windows, and prefix sets
/// at random, these fix one representative per journey so that two runs issue
/// the same requests.
#[must_use]
pub fn journeys_for(search_path: &str, suggest_path: &str) -> Vec<Journey> {
    let mut basic = vec![LoadStep::homepage()];
    basic.extend(
        BASIC_QUERIES
            .iter()
            .map(|query| LoadStep::search(search_path, query)),
    );

    let laptop_brand = [("brand", LAPTOP_BRANDS[0])];
    let pagination = Journey::new(
        "pagination_and_filter",
        vec![
            LoadStep::homepage(),
            LoadStep::search(search_path, "laptop"),
            LoadStep::paginate(search_path, "laptop", 2, &[]),
            LoadStep::paginate(search_path, "laptop", 3, &[]),
            LoadStep::filtered(search_path, "laptop", &laptop_brand),
            LoadStep::paginate(search_path, "laptop", 2, &laptop_brand),
        ],
    );

    let coat_filters = [
        ("brand", COAT_BRANDS[0]),
        ("category", "kadin_giyim"),
        ("price_min", PRICE_RANGES[0].0),
        ("price_max", PRICE_RANGES[0].1),
    ];
    let multi_filter = Journey::new(
        "multi_filter_sort",
        vec![
            LoadStep::homepage(),
            LoadStep::search(search_path, "kadın mont"),
            LoadStep::filtered(search_path, "kadın mont", &coat_filters),
            LoadStep::sorted(search_path, "kadın mont", &coat_filters, SORT_PRICE_ASCENDING),
        ],
    );

    let suggest_journey = |name: &str, prefixes: [&str; 3]| {
        let mut steps = vec![LoadStep::homepage()];
        steps.extend(
            prefixes
                .iter()
                .map(|prefix| LoadStep::suggest(suggest_path, prefix)),
        );
        Journey::new(name, steps)
    };

    let within = Journey::new(
        "search_within_results",
        vec![
            LoadStep::homepage(),
            LoadStep::search(search_path, "laptop"),
            LoadStep::within(search_path, "laptop", "gaming"),
            LoadStep::within(search_path, "laptop", "çanta"),
        ],
    );

    let combined_filters = [
        ("brand", LAPTOP_BRANDS[1]),
        ("price_min", PRICE_RANGES[1].0),
        ("price_max", PRICE_RANGES[1].1),
    ];
    let combined = Journey::new(
        "combined_funnel",
        vec![
            LoadStep::homepage(),
            LoadStep::search(search_path, "laptop"),
            LoadStep::within(search_path, "laptop", "gaming"),
            LoadStep::filtered(search_path, "laptop", &combined_filters),
            LoadStep::sorted(
                search_path,
                "laptop",
                &combined_filters,
                SORT_PRICE_ASCENDING,
            ),
        ],
    );

    vec![
        Journey::new("basic_search", basic),
        pagination,
        multi_filter,
        suggest_journey("suggest_typing_laptop", SUGGEST_PREFIX_SETS[0]),
        suggest_journey("suggest_typing_iphone", SUGGEST_PREFIX_SETS[1]),
        within,
        combined,
    ]
}

/// Configuration for a load run.
#[derive(Debug, Clone)]
pub struct LoadPlan {
    /// Target deployment, scheme and host
    pub base_url: String,
    /// Search results route
    pub search_path: String,
    /// Auto-suggest route
    pub suggest_path: String,
    /// Number of concurrent simulated users
    pub concurrency: usize,
    /// Total duration of the run
    pub duration: Duration,
    /// Pause between steps within a journey
    pub think_time: Duration,
    /// Journeys the users cycle through
    pub journeys: Vec<Journey>,
}

impl LoadPlan {
    /// Plan against `base_url` with the canonical journeys and defaults
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            search_path: SEARCH_PATH.to_string(),
            suggest_path: SUGGEST_PATH.to_string(),
            concurrency: 5,
            duration: Duration::from_secs(30),
            think_time: Duration::from_secs(2),
            journeys: default_journeys(),
        }
    }

    /// Override the number of simulated users
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Override the run duration
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Override the pause between steps
    #[must_use]
    pub fn with_think_time(mut self, think_time: Duration) -> Self {
        self.think_time = think_time;
        self
    }

    /// Point the canonical journeys at custom routes
    #[must_use]
    pub fn with_routes(mut self, search_path: &str, suggest_path: &str) -> Self {
        self.search_path = search_path.to_string();
        self.suggest_path = suggest_path.to_string();
        self.journeys = journeys_for(search_path, suggest_path);
        self
    }

    /// Replace the journeys entirely
    #[must_use]
    pub fn with_journeys(mut self, journeys: Vec<Journey>) -> Self {
        self.journeys = journeys;
        self
    }
}

/// Headers a desktop Chrome sends, so edge caches and bot filters treat the
/// run like browser traffic.
#[must_use]
pub fn default_headers() -> reqwest::header::HeaderMap {
    use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};

    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers
}

/// Individual request timing record.
#[derive(Debug, Clone)]
struct StepRecord {
    journey: String,
    step: String,
    status: u16,
    latency: Duration,
    success: bool,
}

/// Latency summary for one step bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepStats {
    /// Step label
    pub label: String,
    /// Requests issued
    pub requests: u64,
    /// Requests that failed
    pub failed: u64,
    /// Median latency (ms)
    pub latency_p50_ms: f64,
    /// 95th percentile latency (ms)
    pub latency_p95_ms: f64,
}

/// Request counts for one journey.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyStats {
    /// Journey name
    pub name: String,
    /// Requests issued
    pub requests: u64,
    /// Requests that failed
    pub failed: u64,
}

/// Results from a load run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadReport {
    /// Run identifier
    pub run_id: Uuid,
    /// ISO 8601 timestamp of the run
    pub timestamp: String,
    /// Target deployment
    pub base_url: String,
    /// Concurrency level used
    pub concurrency: usize,
    /// Total elapsed wall time (seconds)
    pub elapsed_secs: f64,
    /// Total requests sent
    pub total_requests: u64,
    /// Requests answered with HTTP 200
    pub successful: u64,
    /// Requests that errored or answered any other status
    pub failed: u64,
    /// Successful requests per second
    pub throughput_rps: f64,
    /// Median latency (ms)
    pub latency_p50_ms: f64,
    /// 95th percentile latency (ms)
    pub latency_p95_ms: f64,
    /// 99th percentile latency (ms)
    pub latency_p99_ms: f64,
    /// Per-step latency buckets, in first-seen order
    pub steps: Vec<StepStats>,
    /// Per-journey request counts, in first-seen order
    pub journeys: Vec<JourneyStats>,
}

/// Load run executor.
#[derive(Debug)]
pub struct LoadRunner {
    client: reqwest::Client,
    plan: LoadPlan,
}

impl LoadRunner {
    /// Build a runner, with browser-like headers and a 15 second timeout
    #[must_use]
    pub fn new(plan: LoadPlan) -> Self {
        let client = reqwest::Client::builder()
            .default_headers(default_headers())
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        Self { client, plan }
    }

    /// Run the plan and return aggregated results.
    ///
    /// Each simulated user cycles the journeys round-robin from a
    /// worker-offset start, pausing for the think time between steps, until
    /// the duration elapses. A request counts as failed on any transport
    /// error or non-200 status.
    pub async fn run(&self) -> LoadReport {
        if self.plan.journeys.is_empty() {
            return aggregate(&[], 0.0, &self.plan.base_url, self.plan.concurrency);
        }

        let started = Instant::now();
        let deadline = started + self.plan.duration;
        let mut handles = Vec::new();

        for worker_id in 0..self.plan.concurrency {
            let client = self.client.clone();
            let journeys = self.plan.journeys.clone();
            let base_url = self.plan.base_url.clone();
            let think_time = self.plan.think_time;

            handles.push(tokio::spawn(async move {
                let mut records = Vec::new();
                let mut journey_idx = worker_id % journeys.len();

                while Instant::now() < deadline {
                    let journey = &journeys[journey_idx % journeys.len()];
                    for step in &journey.steps {
                        if Instant::now() >= deadline {
                            break;
                        }
                        let start = Instant::now();
                        let url = format!("{base_url}{}", step.path);
                        let (status, success) =
                            match client.get(&url).query(&step.params).send().await {
                                Ok(response) => {
                                    let status = response.status().as_u16();
                                    let body_ok = response.bytes().await.is_ok();
                                    (status, status == 200 && body_ok)
                                }
                                Err(_) => (0, false),
                            };
                        if !success {
                            tracing::debug!(
                                journey = %journey.name,
                                step = %step.label,
                                status,
                                "load step failed"
                            );
                        }
                        records.push(StepRecord {
                            journey: journey.name.clone(),
                            step: step.label.clone(),
                            status,
                            latency: start.elapsed(),
                            success,
                        });
                        if Instant::now() < deadline {
                            tokio::time::sleep(think_time).await;
                        }
                    }
                    journey_idx += 1;
                }
                records
            }));
        }

        let mut all_records = Vec::new();
        for handle in handles {
            if let Ok(records) = handle.await {
                all_records.extend(records);
            }
        }

        aggregate(
            &all_records,
            started.elapsed().as_secs_f64(),
            &self.plan.base_url,
            self.plan.concurrency,
        )
    }
}

/// Aggregate individual step records into summary statistics.
fn aggregate(
    records: &[StepRecord],
    elapsed_secs: f64,
    base_url: &str,
    concurrency: usize,
) -> LoadReport {
    let total = records.len() as u64;
    let successful = records.iter().filter(|r| r.success).count() as u64;
    let failed = total - successful;

    let mut latencies: Vec<f64> = records
        .iter()
        .filter(|r| r.success)
        .map(|r| r.latency.as_secs_f64() * 1000.0)
        .collect();
    latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let throughput_rps = if elapsed_secs > 0.0 {
        successful as f64 / elapsed_secs
    } else {
        0.0
    };

    let mut steps: Vec<StepStats> = Vec::new();
    for record in records {
        if !steps.iter().any(|s| s.label == record.step) {
            let mut bucket: Vec<f64> = records
                .iter()
                .filter(|r| r.success && r.step == record.step)
                .map(|r| r.latency.as_secs_f64() * 1000.0)
                .collect();
            bucket.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            steps.push(StepStats {
                label: record.step.clone(),
                requests: records.iter().filter(|r| r.step == record.step).count() as u64,
                failed: records
                    .iter()
                    .filter(|r| r.step == record.step && !r.success)
                    .count() as u64,
                latency_p50_ms: percentile(&bucket, 0.50),
                latency_p95_ms: percentile(&bucket, 0.95),
            });
        }
    }

    let mut journeys: Vec<JourneyStats> = Vec::new();
    for record in records {
        if !journeys.iter().any(|j| j.name == record.journey) {
            journeys.push(JourneyStats {
                name: record.journey.clone(),
                requests: records.iter().filter(|r| r.journey == record.journey).count() as u64,
                failed: records
                    .iter()
                    .filter(|r| r.journey == record.journey && !r.success)
                    .count() as u64,
            });
        }
    }

    LoadReport {
        run_id: Uuid::new_v4(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        base_url: base_url.to_string(),
        concurrency,
        elapsed_secs,
        total_requests: total,
        successful,
        failed,
        throughput_rps,
        latency_p50_ms: percentile(&latencies, 0.50),
        latency_p95_ms: percentile(&latencies, 0.95),
        latency_p99_ms: percentile(&latencies, 0.99),
        steps,
        journeys,
    }
}

/// Compute a percentile from a sorted slice. Returns 0.0 for empty slices.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() as f64 - 1.0) * p).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn record(journey: &str, step: &str, latency_ms: u64, success: bool) -> StepRecord {
        StepRecord {
            journey: journey.to_string(),
            step: step.to_string(),
            status: if success { 200 } else { 500 },
            latency: Duration::from_millis(latency_ms),
            success,
        }
    }

    mod percentile_tests {
        use super::*;

        #[test]
        fn empty_is_zero() {
            assert_eq!(percentile(&[], 0.5), 0.0);
        }

        #[test]
        fn single_value_answers_every_percentile() {
            assert_eq!(percentile(&[42.0], 0.5), 42.0);
            assert_eq!(percentile(&[42.0], 0.99), 42.0);
        }

        #[test]
        fn nearest_rank_on_a_hundred_values() {
            let data: Vec<f64> = (1..=100).map(f64::from).collect();
            // p50 of [1..100]: index = round(99 * 0.50) = 50 → value 51
            assert_eq!(percentile(&data, 0.50), 51.0);
            assert_eq!(percentile(&data, 0.95), 95.0);
            assert_eq!(percentile(&data, 0.99), 99.0);
        }

        #[test]
        fn boundary_percentiles() {
            let data = vec![1.0, 2.0, 3.0];
            assert_eq!(percentile(&data, 0.0), 1.0);
            assert_eq!(percentile(&data, 1.0), 3.0);
        }
    }

    mod step_tests {
        use super::*;

        #[test]
        fn search_carries_the_query() {
            let step = LoadStep::search("/arama", "laptop");
            assert_eq!(step.path, "/arama");
            assert_eq!(step.params, vec![("q".to_string(), "laptop".to_string())]);
            assert_eq!(step.label, "search");
        }

        #[test]
        fn paginate_keeps_active_filters() {
            let step = LoadStep::paginate("/arama", "laptop", 2, &[("brand", "asus")]);
            assert!(step.params.contains(&("pg".to_string(), "2".to_string())));
            assert!(step.params.contains(&("brand".to_string(), "asus".to_string())));
        }

        #[test]
        fn sorted_search_sets_the_sort_key() {
            let step = LoadStep::sorted("/arama", "laptop", &[], SORT_PRICE_ASCENDING);
            assert!(step
                .params
                .contains(&("srt".to_string(), "PRICE_LOW".to_string())));
        }

        #[test]
        fn suggest_and_within_use_their_own_params() {
            let suggest = LoadStep::suggest("/arama/tamamla", "lap");
            assert_eq!(suggest.path, "/arama/tamamla");
            assert_eq!(
                suggest.params,
                vec![("keyword".to_string(), "lap".to_string())]
            );

            let within = LoadStep::within("/arama", "laptop", "gaming");
            assert!(within.params.contains(&("iw".to_string(), "gaming".to_string())));
        }
    }

    mod journey_tests {
        use super::*;

        #[test]
        fn seven_canonical_journeys_with_unique_names() {
            let journeys = default_journeys();
            assert_eq!(journeys.len(), 7);

            let mut names: Vec<&str> = journeys.iter().map(|j| j.name.as_str()).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), 7);
        }

        #[test]
        fn every_journey_opens_the_homepage_first() {
            for journey in default_journeys() {
                assert_eq!(journey.steps[0].label, "homepage", "{}", journey.name);
            }
        }

        #[test]
        fn custom_routes_flow_into_every_step() {
            let journeys = journeys_for("/search", "/search/complete");
            for journey in &journeys {
                for step in &journey.steps {
                    assert!(
                        step.path == "/" || step.path.starts_with("/search"),
                        "{} hit {}",
                        journey.name,
                        step.path
                    );
                }
            }
            let suggest_steps = journeys
                .iter()
                .flat_map(|j| &j.steps)
                .filter(|s| s.label == "suggest")
                .count();
            assert_eq!(suggest_steps, 6);
        }

        #[test]
        fn combined_funnel_ends_with_a_sort() {
            let journeys = default_journeys();
            let combined = journeys.iter().find(|j| j.name == "combined_funnel").unwrap();
            assert_eq!(combined.steps.last().unwrap().label, "sort");
        }
    }

    mod plan_tests {
        use super::*;

        #[test]
        fn defaults_match_the_original_session_shape() {
            let plan = LoadPlan::new("https://shop.example.com/");
            assert_eq!(plan.base_url, "https://shop.example.com");
            assert_eq!(plan.search_path, SEARCH_PATH);
            assert_eq!(plan.suggest_path, SUGGEST_PATH);
            assert_eq!(plan.concurrency, 5);
            assert_eq!(plan.duration, Duration::from_secs(30));
            assert_eq!(plan.think_time, Duration::from_secs(2));
            assert_eq!(plan.journeys.len(), 7);
        }

        #[test]
        fn with_routes_rebuilds_the_journeys() {
            let plan = LoadPlan::new("https://shop.example.com")
                .with_routes("/search", "/search/complete");
            assert!(plan
                .journeys
                .iter()
                .flat_map(|j| &j.steps)
                .all(|s| s.path == "/" || s.path.starts_with("/search")));
        }

        #[test]
        fn default_headers_look_like_a_browser() {
            let headers = default_headers();
            let agent = headers.get(reqwest::header::USER_AGENT).unwrap();
            assert!(agent.to_str().unwrap().contains("Chrome/123"));
            assert!(headers.contains_key(reqwest::header::ACCEPT_LANGUAGE));
            assert!(headers.contains_key(reqwest::header::ACCEPT));
        }
    }

    mod aggregate_tests {
        use super::*;

        #[test]
        fn empty_run_reports_zeroes() {
            let report = aggregate(&[], 10.0, "https://shop.example.com", 5);
            assert_eq!(report.total_requests, 0);
            assert_eq!(report.successful, 0);
            assert_eq!(report.failed, 0);
            assert_eq!(report.throughput_rps, 0.0);
            assert_eq!(report.latency_p50_ms, 0.0);
            assert!(report.steps.is_empty());
            assert!(report.journeys.is_empty());
        }

        #[test]
        fn all_success_throughput_counts_per_second() {
            let records: Vec<StepRecord> = (0..10)
                .map(|i| record("basic_search", "search", 100 + i * 10, true))
                .collect();
            let report = aggregate(&records, 10.0, "https://shop.example.com", 2);
            assert_eq!(report.total_requests, 10);
            assert_eq!(report.successful, 10);
            assert_eq!(report.failed, 0);
            assert!((report.throughput_rps - 1.0).abs() < f64::EPSILON);
            assert!(report.latency_p50_ms > 0.0);
            assert_eq!(report.concurrency, 2);
        }

        #[test]
        fn failures_split_out_per_step_and_journey() {
            let records = vec![
                record("basic_search", "homepage", 80, true),
                record("basic_search", "search", 120, true),
                record("basic_search", "search", 0, false),
                record("combined_funnel", "sort", 200, true),
            ];
            let report = aggregate(&records, 5.0, "https://shop.example.com", 1);
            assert_eq!(report.total_requests, 4);
            assert_eq!(report.successful, 3);
            assert_eq!(report.failed, 1);

            let labels: Vec<&str> = report.steps.iter().map(|s| s.label.as_str()).collect();
            assert_eq!(labels, vec!["homepage", "search", "sort"]);
            let search = report.steps.iter().find(|s| s.label == "search").unwrap();
            assert_eq!(search.requests, 2);
            assert_eq!(search.failed, 1);
            assert_eq!(search.latency_p50_ms, 120.0);

            let journeys: Vec<&str> = report.journeys.iter().map(|j| j.name.as_str()).collect();
            assert_eq!(journeys, vec!["basic_search", "combined_funnel"]);
            assert_eq!(report.journeys[0].requests, 3);
            assert_eq!(report.journeys[0].failed, 1);
        }

        #[test]
        fn zero_elapsed_cannot_divide() {
            let records = vec![record("basic_search", "search", 100, true)];
            let report = aggregate(&records, 0.0, "https://shop.example.com", 1);
            assert_eq!(report.throughput_rps, 0.0);
        }

        #[test]
        fn report_round_trips_through_json() {
            let records = vec![record("basic_search", "search", 100, true)];
            let report = aggregate(&records, 2.0, "https://shop.example.com", 1);
            let json = serde_json::to_string(&report).unwrap();
            let back: LoadReport = serde_json::from_str(&json).unwrap();
            assert_eq!(back.run_id, report.run_id);
            assert_eq!(back.total_requests, 1);
            assert_eq!(back.steps.len(), 1);
        }
    }
}
