use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

use dashmap::DashMap;
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use serde::{Serialize, Serializer};

/// Nanoseconds per histogram bucket for normal runs. Microsecond-level
/// precision while keeping the bucket set small even for very long runs.
pub const DEFAULT_ACCURACY: u32 = 100;

/// Outcome label used for dry-run iterations.
pub const DRY_RUN_KEY: &str = "dry-run";

/// Latency sketch shared by all workers.
///
/// Samples are grouped by outcome label (status code, error description or
/// `"dry-run"`) and quantized by `accuracy` nanoseconds per bucket. Labels
/// are sharded through the DashMap, so workers recording different outcomes
/// do not contend; within a label a plain mutex guards the bucket map.
pub struct ResponseData {
    responses: DashMap<String, Mutex<HashMap<u64, u64>>>,
    accuracy: u64,
}

impl ResponseData {
    pub fn new(accuracy: u32) -> Self {
        ResponseData {
            responses: DashMap::new(),
            accuracy: accuracy.max(1) as u64,
        }
    }

    /// Records one sample under `key`.
    pub fn add(&self, key: &str, elapsed: Duration) {
        let bucket = elapsed.as_nanos() as u64 / self.accuracy;
        if let Some(entry) = self.responses.get(key) {
            let mut buckets = entry.lock().unwrap_or_else(|e| e.into_inner());
            *buckets.entry(bucket).or_insert(0) += 1;
            return;
        }
        let entry = self.responses.entry(key.to_owned()).or_default();
        let mut buckets = entry.lock().unwrap_or_else(|e| e.into_inner());
        *buckets.entry(bucket).or_insert(0) += 1;
    }

    /// Summarizes all recorded samples. Safe to call after the run ends.
    pub fn report(&self) -> Report {
        let mut responses = BTreeMap::new();
        let mut merged: HashMap<u64, u64> = HashMap::new();

        for entry in self.responses.iter() {
            let buckets = entry.value().lock().unwrap_or_else(|e| e.into_inner());
            responses.insert(entry.key().clone(), calculate_stats(&buckets, self.accuracy));
            for (bucket, count) in buckets.iter() {
                *merged.entry(*bucket).or_insert(0) += count;
            }
        }

        let total = if responses.is_empty() {
            ResponseStat::default()
        } else {
            calculate_stats(&merged, self.accuracy)
        };

        Report { responses, total }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub responses: BTreeMap<String, ResponseStat>,
    pub total: ResponseStat,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResponseStat {
    pub count: BigCount,
    pub min: HumanDuration,
    pub max: HumanDuration,
    pub average: HumanDuration,
    pub p90: HumanDuration,
    pub p95: HumanDuration,
    pub p99: HumanDuration,
}

fn calculate_stats(durations: &HashMap<u64, u64>, accuracy: u64) -> ResponseStat {
    if durations.is_empty() {
        return ResponseStat::default();
    }

    let mut sorted: Vec<u64> = durations.keys().copied().collect();
    sorted.sort_unstable();

    let min = Duration::from_nanos(sorted[0] * accuracy);
    let max = Duration::from_nanos(sorted[sorted.len() - 1] * accuracy);

    let mut total_count = BigUint::ZERO;
    let mut sum = BigUint::ZERO;
    for &bucket in &sorted {
        let count = durations[&bucket];
        total_count += BigUint::from(count);
        sum += BigUint::from(bucket * accuracy) * BigUint::from(count);
    }

    let p90 = percentile(&sorted, durations, &total_count, 90, accuracy);
    let p95 = percentile(&sorted, durations, &total_count, 95, accuracy);
    let p99 = percentile(&sorted, durations, &total_count, 99, accuracy);

    let average = div_round(&sum, &total_count)
        .to_u64()
        .map(Duration::from_nanos)
        .unwrap_or(max);

    ResponseStat {
        count: BigCount(total_count),
        min: HumanDuration(min),
        max: HumanDuration(max),
        average: HumanDuration(average),
        p90: HumanDuration(p90),
        p95: HumanDuration(p95),
        p99: HumanDuration(p99),
    }
}

/// Ceiling-rank percentile: the first bucket whose running count reaches
/// `ceil(total * percentile / 100)` defines the value. A sample exactly on
/// a bucket boundary is therefore attributed to the higher bucket.
fn percentile(
    sorted: &[u64],
    durations: &HashMap<u64, u64>,
    total_count: &BigUint,
    percentile: u32,
    accuracy: u64,
) -> Duration {
    let target = (total_count * BigUint::from(percentile) + BigUint::from(99u32))
        / BigUint::from(100u32);

    let mut cumulative = BigUint::ZERO;
    for &bucket in sorted {
        cumulative += BigUint::from(durations[&bucket]);
        if cumulative >= target {
            return Duration::from_nanos(bucket * accuracy);
        }
    }

    Duration::from_nanos(sorted[sorted.len() - 1] * accuracy)
}

/// Division rounded to the nearest integer.
fn div_round(x: &BigUint, y: &BigUint) -> BigUint {
    let quotient = x / y;
    let remainder = x % y;
    if remainder * 2u32 >= *y {
        quotient + 1u32
    } else {
        quotient
    }
}

/// Request count that may exceed 2^63. Serialized as an integer while it
/// fits in `u128`, as a decimal string beyond that.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BigCount(pub BigUint);

impl Serialize for BigCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let Some(v) = self.0.to_u64() {
            serializer.serialize_u64(v)
        } else if let Some(v) = self.0.to_u128() {
            serializer.serialize_u128(v)
        } else {
            serializer.serialize_str(&self.0.to_string())
        }
    }
}

impl fmt::Display for BigCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Duration rendered with magnitude-scaled precision: rounded to
/// milliseconds at one second and above, to microseconds at one millisecond
/// and above, exact nanoseconds below that.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct HumanDuration(pub Duration);

impl Serialize for HumanDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_duration(self.0))
    }
}

fn round_to(d: Duration, unit: u64) -> Duration {
    let ns = d.as_nanos();
    let unit = unit as u128;
    Duration::from_nanos((((ns + unit / 2) / unit) * unit) as u64)
}

fn format_duration(d: Duration) -> String {
    let d = if d >= Duration::from_secs(1) {
        round_to(d, 1_000_000)
    } else if d >= Duration::from_millis(1) {
        round_to(d, 1_000)
    } else {
        d
    };

    let total = d.as_nanos();
    if total == 0 {
        return "0s".to_owned();
    }
    if total < 1_000 {
        return format!("{total}ns");
    }
    if total < 1_000_000 {
        return format!("{}µs", fmt_decimal(total, 1_000));
    }
    if total < 1_000_000_000 {
        return format!("{}ms", fmt_decimal(total, 1_000_000));
    }

    let secs = (total / 1_000_000_000) as u64;
    let frac_ns = (total % 1_000_000_000) as u128;
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let sec_ns = u128::from(secs % 60) * 1_000_000_000 + frac_ns;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h{mins}m"));
    } else if mins > 0 {
        out.push_str(&format!("{mins}m"));
    }
    out.push_str(&fmt_decimal(sec_ns, 1_000_000_000));
    out.push('s');
    out
}

fn fmt_decimal(value: u128, unit: u128) -> String {
    let whole = value / unit;
    let frac = value % unit;
    if frac == 0 {
        return whole.to_string();
    }
    let width = unit.ilog10() as usize;
    let mut frac_str = format!("{frac:0width$}");
    while frac_str.ends_with('0') {
        frac_str.pop();
    }
    format!("{whole}.{frac_str}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(buckets: &[(u64, u64)], accuracy: u64) -> ResponseStat {
        let map: HashMap<u64, u64> = buckets.iter().copied().collect();
        calculate_stats(&map, accuracy)
    }

    #[test]
    fn quantization_groups_samples() {
        let data = ResponseData::new(100);
        data.add("200", Duration::from_nanos(150));
        data.add("200", Duration::from_nanos(199));
        data.add("200", Duration::from_nanos(250));
        let report = data.report();
        let stat = &report.responses["200"];
        assert_eq!(stat.count, BigCount(BigUint::from(3u32)));
        // 150 and 199 collapse into bucket 1, 250 into bucket 2.
        assert_eq!(stat.min.0, Duration::from_nanos(100));
        assert_eq!(stat.max.0, Duration::from_nanos(200));
    }

    #[test]
    fn percentile_uses_ceiling_rank() {
        // Ten samples, one per bucket 1..=10, accuracy 1ns.
        let buckets: Vec<(u64, u64)> = (1..=10).map(|b| (b, 1)).collect();
        let s = stat(&buckets, 1);
        // rank(90) = ceil(10*90/100) = 9 -> bucket 9
        assert_eq!(s.p90.0, Duration::from_nanos(9));
        // rank(95) = ceil(9.5) = 10 -> bucket 10
        assert_eq!(s.p95.0, Duration::from_nanos(10));
        assert_eq!(s.p99.0, Duration::from_nanos(10));
    }

    #[test]
    fn percentile_order_invariant() {
        let s = stat(&[(5, 3), (10, 2), (100, 1), (7, 10)], 100);
        assert!(s.min.0 <= s.p90.0);
        assert!(s.p90.0 <= s.p95.0);
        assert!(s.p95.0 <= s.p99.0);
        assert!(s.p99.0 <= s.max.0);
        assert!(s.min.0 <= s.average.0 && s.average.0 <= s.max.0);
    }

    #[test]
    fn average_rounds_to_nearest() {
        // buckets 1 and 2 with one sample each, accuracy 1: avg 1.5 -> 2.
        let s = stat(&[(1, 1), (2, 1)], 1);
        assert_eq!(s.average.0, Duration::from_nanos(2));
    }

    #[test]
    fn total_merges_all_labels() {
        let data = ResponseData::new(1);
        data.add("200", Duration::from_nanos(10));
        data.add("200", Duration::from_nanos(20));
        data.add("timeout", Duration::from_nanos(30));
        let report = data.report();
        assert_eq!(report.total.count, BigCount(BigUint::from(3u32)));
        let per_label: BigUint = report
            .responses
            .values()
            .map(|s| s.count.0.clone())
            .sum();
        assert_eq!(report.total.count.0, per_label);
        assert_eq!(report.total.min.0, Duration::from_nanos(10));
        assert_eq!(report.total.max.0, Duration::from_nanos(30));
    }

    #[test]
    fn single_label_total_equals_label() {
        let data = ResponseData::new(1);
        data.add("200", Duration::from_millis(5));
        let report = data.report();
        let stat = &report.responses["200"];
        assert_eq!(report.total.count, stat.count);
        assert_eq!(report.total.min, stat.min);
        assert_eq!(report.total.p99, stat.p99);
    }

    #[test]
    fn empty_report_is_well_formed() {
        let data = ResponseData::new(100);
        let report = data.report();
        assert!(report.responses.is_empty());
        assert_eq!(report.total.count, BigCount(BigUint::ZERO));
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(Duration::from_nanos(0)), "0s");
        assert_eq!(format_duration(Duration::from_nanos(500)), "500ns");
        assert_eq!(format_duration(Duration::from_nanos(1_500)), "1.5µs");
        // >= 1ms rounds to microseconds
        assert_eq!(format_duration(Duration::from_nanos(1_234_567)), "1.235ms");
        assert_eq!(format_duration(Duration::from_millis(100)), "100ms");
        // >= 1s rounds to milliseconds
        assert_eq!(
            format_duration(Duration::from_nanos(1_234_567_890)),
            "1.235s"
        );
        assert_eq!(format_duration(Duration::from_secs(90)), "1m30s");
        assert_eq!(format_duration(Duration::from_secs(3600)), "1h0m0s");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
    }

    #[test]
    fn report_serializes_with_stable_shape() {
        let data = ResponseData::new(1);
        data.add("200", Duration::from_millis(1));
        let report = data.report();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("responses").is_some());
        assert!(json.get("total").is_some());
        assert_eq!(json["responses"]["200"]["count"], 1);
        assert_eq!(json["total"]["min"], "1ms");
    }
}
