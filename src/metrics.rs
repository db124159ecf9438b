//! Performance metrics and statistics tracking for the scoring service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for the scoring service
pub struct ServiceMetrics {
    /// Total assessments completed
    pub assessments_completed: AtomicU64,
    /// Total assessment failures (upstream or parse)
    pub assessments_failed: AtomicU64,
    /// Total workflow decisions produced
    pub decisions_completed: AtomicU64,
    /// Decisions by disposition (authorized, SentToFraudDept, suspended)
    decisions_by_result: RwLock<HashMap<String, u64>>,
    /// Assessments by risk score (index 0 = score 1)
    score_buckets: RwLock<[u64; 5]>,
    /// Assessment latencies (in microseconds)
    assessment_times: RwLock<Vec<u64>>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl ServiceMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            assessments_completed: AtomicU64::new(0),
            assessments_failed: AtomicU64::new(0),
            decisions_completed: AtomicU64::new(0),
            decisions_by_result: RwLock::new(HashMap::new()),
            score_buckets: RwLock::new([0; 5]),
            assessment_times: RwLock::new(Vec::with_capacity(1000)),
            start_time: Instant::now(),
        }
    }

    /// Record a completed assessment
    pub fn record_assessment(&self, elapsed: Duration, risk_score: i32) {
        self.assessments_completed.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut times) = self.assessment_times.write() {
            times.push(elapsed.as_micros() as u64);
            // Keep only last 10000 for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        if (1..=5).contains(&risk_score) {
            if let Ok(mut buckets) = self.score_buckets.write() {
                buckets[(risk_score - 1) as usize] += 1;
            }
        }
    }

    /// Record a failed assessment
    pub fn record_assessment_failure(&self) {
        self.assessments_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a workflow decision
    pub fn record_decision(&self, result: &str) {
        self.decisions_completed.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut by_result) = self.decisions_by_result.write() {
            *by_result.entry(result.to_string()).or_insert(0) += 1;
        }
    }

    /// Get assessment latency statistics
    pub fn get_latency_stats(&self) -> LatencyStats {
        let times = self.assessment_times.read().unwrap();
        if times.is_empty() {
            return LatencyStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
        }
    }

    /// Get current throughput (assessments per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.assessments_completed.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get assessments by risk score
    pub fn get_score_distribution(&self) -> [u64; 5] {
        *self.score_buckets.read().unwrap()
    }

    /// Get decisions by disposition
    pub fn get_decisions_by_result(&self) -> HashMap<String, u64> {
        self.decisions_by_result.read().unwrap().clone()
    }

    /// Render the counters in Prometheus text exposition format
    pub fn render_prometheus(&self) -> String {
        let mut out = String::new();

        out.push_str("# HELP fraud_agent_up Service up indicator\n");
        out.push_str("# TYPE fraud_agent_up gauge\n");
        out.push_str("fraud_agent_up 1\n");

        out.push_str("# HELP fraud_agent_assessments_total Completed assessments\n");
        out.push_str("# TYPE fraud_agent_assessments_total counter\n");
        out.push_str(&format!(
            "fraud_agent_assessments_total {}\n",
            self.assessments_completed.load(Ordering::Relaxed)
        ));

        out.push_str("# HELP fraud_agent_assessment_failures_total Failed assessments\n");
        out.push_str("# TYPE fraud_agent_assessment_failures_total counter\n");
        out.push_str(&format!(
            "fraud_agent_assessment_failures_total {}\n",
            self.assessments_failed.load(Ordering::Relaxed)
        ));

        out.push_str("# HELP fraud_agent_assessments_by_score Assessments by risk score\n");
        out.push_str("# TYPE fraud_agent_assessments_by_score counter\n");
        for (i, count) in self.get_score_distribution().iter().enumerate() {
            out.push_str(&format!(
                "fraud_agent_assessments_by_score{{risk_score=\"{}\"}} {}\n",
                i + 1,
                count
            ));
        }

        out.push_str("# HELP fraud_agent_decisions_total Workflow decisions by result\n");
        out.push_str("# TYPE fraud_agent_decisions_total counter\n");
        let mut results: Vec<(String, u64)> = self.get_decisions_by_result().into_iter().collect();
        results.sort();
        for (result, count) in results {
            out.push_str(&format!(
                "fraud_agent_decisions_total{{result=\"{result}\"}} {count}\n"
            ));
        }

        out
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let assessed = self.assessments_completed.load(Ordering::Relaxed);
        let failed = self.assessments_failed.load(Ordering::Relaxed);
        let decisions = self.decisions_completed.load(Ordering::Relaxed);
        let latency = self.get_latency_stats();
        let throughput = self.get_throughput();
        let score_dist = self.get_score_distribution();

        info!(
            assessments = assessed,
            failures = failed,
            decisions = decisions,
            throughput = format!("{:.2} tx/s", throughput),
            "Service metrics summary"
        );
        info!(
            mean_us = latency.mean_us,
            p50_us = latency.p50_us,
            p95_us = latency.p95_us,
            p99_us = latency.p99_us,
            "Assessment latency (us)"
        );
        for (i, count) in score_dist.iter().enumerate() {
            if *count > 0 {
                info!(risk_score = i + 1, count = count, "Risk score bucket");
            }
        }
        for (result, count) in self.get_decisions_by_result() {
            info!(result = %result, count = count, "Decision bucket");
        }
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Assessment latency statistics
#[derive(Debug, Default)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
}

/// Periodic reporter that prints metrics summaries
pub struct MetricsReporter {
    metrics: std::sync::Arc<ServiceMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: std::sync::Arc<ServiceMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}
