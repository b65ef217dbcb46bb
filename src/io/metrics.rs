// Throughput and durability-barrier metrics for a wipe

use std::collections::{BTreeMap, VecDeque};
use std::time::{Duration, Instant};

/// Number of most recent sync latencies kept for percentiles
const LATENCY_WINDOW: usize = 1000;

/// Per-wipe write metrics, owned by the engine's write loop
#[derive(Debug, Clone)]
pub struct WipeMetrics {
    start_time: Instant,
    bytes_written: u64,
    blocks_written: u64,
    sync_latencies: VecDeque<Duration>,
    total_sync_time: Duration,
}

impl Default for WipeMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl WipeMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            bytes_written: 0,
            blocks_written: 0,
            sync_latencies: VecDeque::with_capacity(LATENCY_WINDOW),
            total_sync_time: Duration::ZERO,
        }
    }

    /// Record one block written and made durable
    pub fn record_block(&mut self, bytes: u64, sync_latency: Duration) {
        self.bytes_written += bytes;
        self.blocks_written += 1;
        self.total_sync_time += sync_latency;

        if self.sync_latencies.len() == LATENCY_WINDOW {
            self.sync_latencies.pop_front();
        }
        self.sync_latencies.push_back(sync_latency);
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn blocks_written(&self) -> u64 {
        self.blocks_written
    }

    /// Bytes per second since the metrics were created
    pub fn throughput(&self) -> u64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed < 0.001 {
            return 0;
        }
        (self.bytes_written as f64 / elapsed) as u64
    }

    /// Mean flush + sync latency over every recorded block
    pub fn average_sync_latency(&self) -> Duration {
        mean_latency(self.total_sync_time, self.blocks_written)
    }

    /// Sync latency percentile over the recent window
    pub fn sync_latency_percentile(&self, percentile: f64) -> Duration {
        if self.sync_latencies.is_empty() {
            return Duration::ZERO;
        }

        let mut sorted: Vec<Duration> = self.sync_latencies.iter().copied().collect();
        sorted.sort();
        let index = ((percentile / 100.0) * sorted.len() as f64) as usize;
        sorted[index.min(sorted.len() - 1)]
    }

    pub fn stats(&self) -> PerformanceStats {
        PerformanceStats {
            elapsed: self.start_time.elapsed(),
            bytes_written: self.bytes_written,
            blocks_written: self.blocks_written,
            throughput_bps: self.throughput(),
            avg_sync_latency: self.average_sync_latency(),
            p99_sync_latency: self.sync_latency_percentile(99.0),
        }
    }
}

/// Snapshot of wipe performance
#[derive(Debug, Clone)]
pub struct PerformanceStats {
    pub elapsed: Duration,
    pub bytes_written: u64,
    pub blocks_written: u64,
    pub throughput_bps: u64,
    pub avg_sync_latency: Duration,
    pub p99_sync_latency: Duration,
}

impl PerformanceStats {
    pub fn throughput_mbps(&self) -> f64 {
        self.throughput_bps as f64 / (1024.0 * 1024.0)
    }

    /// Flatten into result metadata entries
    pub fn to_metadata(&self) -> BTreeMap<String, String> {
        let mut meta = BTreeMap::new();
        meta.insert("metrics.bytes_written".to_string(), self.bytes_written.to_string());
        meta.insert("metrics.blocks_written".to_string(), self.blocks_written.to_string());
        meta.insert("metrics.throughput_bps".to_string(), self.throughput_bps.to_string());
        meta.insert(
            "metrics.avg_sync_latency_us".to_string(),
            self.avg_sync_latency.as_micros().to_string(),
        );
        meta.insert(
            "metrics.p99_sync_latency_us".to_string(),
            self.p99_sync_latency.as_micros().to_string(),
        );
        meta
    }

    /// Human-readable one-liner, e.g. "12.50 MB/s, 3200 blocks, avg sync 1.2ms"
    pub fn format(&self) -> String {
        format!(
            "{:.2} MB/s, {} blocks, avg sync {}",
            self.throughput_mbps(),
            self.blocks_written,
            humantime::format_duration(truncate_to_micros(self.avg_sync_latency)),
        )
    }
}

fn truncate_to_micros(d: Duration) -> Duration {
    Duration::from_micros(d.as_micros().min(u64::MAX as u128) as u64)
}

/// Divides in nanoseconds so block counts past `u32::MAX` are not clamped
pub(super) fn mean_latency(total: Duration, blocks: u64) -> Duration {
    if blocks == 0 {
        return Duration::ZERO;
    }
    let nanos = total.as_nanos() / u128::from(blocks);
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}
