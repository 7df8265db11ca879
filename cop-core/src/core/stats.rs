//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Tile acquisition statistics

use stats::{MinMax, OnlineStats};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

struct Measurements {
    online: OnlineStats,
    minmax: MinMax<u64>,
}

impl Measurements {
    fn new() -> Measurements {
        Measurements {
            online: OnlineStats::new(),
            minmax: MinMax::new(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Summary {
    pub count: usize,
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    pub stddev: f64,
}

/// Timings and failures per layer and zoom level
#[derive(Default)]
pub struct FetchStatistics {
    timings: BTreeMap<String, Measurements>,
    failures: BTreeMap<String, usize>,
}

fn stat_key(layer: &str, zoom: u8) -> String {
    format!("{}.{:02}", layer, zoom)
}

impl FetchStatistics {
    pub fn new() -> FetchStatistics {
        FetchStatistics::default()
    }
    /// Record the acquisition time of a resolved tile in milliseconds
    pub fn record(&mut self, layer: &str, zoom: u8, elapsed: Duration) {
        let millis = elapsed.as_millis() as u64;
        let m = self
            .timings
            .entry(stat_key(layer, zoom))
            .or_insert_with(Measurements::new);
        m.online.add(millis);
        m.minmax.add(millis);
    }
    pub fn record_failure(&mut self, layer: &str, zoom: u8) {
        *self.failures.entry(stat_key(layer, zoom)).or_insert(0) += 1;
    }
    pub fn summary(&self, layer: &str, zoom: u8) -> Summary {
        match self.timings.get(&stat_key(layer, zoom)) {
            Some(m) => Summary {
                count: m.minmax.len(),
                min: *m.minmax.min().unwrap_or(&0),
                max: *m.minmax.max().unwrap_or(&0),
                mean: m.online.mean(),
                stddev: m.online.stddev(),
            },
            None => Summary::default(),
        }
    }
    pub fn failures(&self, layer: &str, zoom: u8) -> usize {
        *self.failures.get(&stat_key(layer, zoom)).unwrap_or(&0)
    }
    pub fn total_failures(&self) -> usize {
        self.failures.values().sum()
    }
    pub fn total_resolved(&self) -> usize {
        self.timings.values().map(|m| m.minmax.len()).sum()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "tiles: {}, min: {}ms, max: {}ms, mean: {:.1}ms +/- {:.1}",
            self.count, self.min, self.max, self.mean, self.stddev
        )
    }
}

impl fmt::Debug for FetchStatistics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (key, m) in &self.timings {
            let _ = writeln!(
                f,
                "{}: {} tiles, mean {:.1}ms",
                key,
                m.minmax.len(),
                m.online.mean()
            );
        }
        for (key, count) in &self.failures {
            let _ = writeln!(f, "{}: {} failed", key, count);
        }
        Ok(())
    }
}

#[test]
fn timings() {
    let mut stats = FetchStatistics::new();
    stats.record("land:World", 8, Duration::from_millis(10));
    assert_eq!(stats.summary("land:World", 8).mean, 10.0);
    stats.record("land:World", 8, Duration::from_millis(20));
    stats.record("land:World", 8, Duration::from_millis(30));
    stats.record("land:World", 9, Duration::from_millis(5));
    let summary = stats.summary("land:World", 8);
    assert_eq!(summary.count, 3);
    assert_eq!(summary.min, 10);
    assert_eq!(summary.max, 30);
    assert_eq!(summary.mean, 20.0);
    assert!((summary.stddev - 8.164965809).abs() < 1e-6);
    assert_eq!(stats.total_resolved(), 4);

    assert_eq!(stats.summary("land:World", 10), Summary::default());
    assert_eq!(
        format!("{}", stats.summary("land:World", 9)),
        "tiles: 1, min: 5ms, max: 5ms, mean: 5.0ms +/- 0.0"
    );
}

#[test]
fn failures() {
    let mut stats = FetchStatistics::new();
    stats.record_failure("perth:Roads", 12);
    stats.record_failure("perth:Roads", 12);
    stats.record_failure("perth:Roads", 13);
    assert_eq!(stats.failures("perth:Roads", 12), 2);
    assert_eq!(stats.failures("perth:Roads", 14), 0);
    assert_eq!(stats.total_failures(), 3);
    assert_eq!(stats.total_resolved(), 0);
}
