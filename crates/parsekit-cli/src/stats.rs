// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Process-wide counters and timing tables.
//!
//! An ultra-simple, concurrency-safe counter set plus a label → duration
//! table, both reported sorted on demand. Workers across the pool bump
//! the same tables; the mutexes are held only for the map update, never
//! across the timed action itself.

use std::collections::BTreeMap;
use std::sync::{LazyLock, Mutex};
use std::time::{Duration, Instant};

static COUNTERS: LazyLock<Mutex<BTreeMap<String, u64>>> =
    LazyLock::new(|| Mutex::new(BTreeMap::new()));

static TIMINGS: LazyLock<Mutex<BTreeMap<String, Duration>>> =
    LazyLock::new(|| Mutex::new(BTreeMap::new()));

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Anchors the process start time; call once, early in `main`.
pub fn init() {
    LazyLock::force(&START_TIME);
}

/// Increments a counter by `value` and returns the new total.
pub fn bump(name: &str, value: u64) -> u64 {
    let mut counters = COUNTERS.lock().expect("counter table poisoned");
    let total = counters.entry(name.to_owned()).or_insert(0);
    *total += value;
    *total
}

/// Retrieves a counter's current value.
#[must_use]
pub fn fetch(name: &str) -> u64 {
    let counters = COUNTERS.lock().expect("counter table poisoned");
    counters.get(name).copied().unwrap_or(0)
}

/// Prints the counters in alphabetical order.
pub fn report_counters() {
    let counters = COUNTERS.lock().expect("counter table poisoned");
    for (name, value) in counters.iter() {
        println!("{name}: {value}");
    }
}

/// Runs `action`, recording its duration under `label`.
///
/// Unless `always` is set, only actions taking a millisecond or more are
/// recorded; repeated labels accumulate.
pub fn time<T>(label: &str, always: bool, action: impl FnOnce() -> T) -> T {
    let started = Instant::now();
    let result = action();
    let elapsed = started.elapsed();
    if always || elapsed >= Duration::from_millis(1) {
        let mut timings = TIMINGS.lock().expect("timing table poisoned");
        *timings.entry(label.to_owned()).or_default() += elapsed;
    }
    result
}

/// Prints the timing table in alphabetical order, including the total
/// process runtime.
pub fn report_timings() {
    let mut timings = TIMINGS.lock().expect("timing table poisoned").clone();
    timings.insert("total".to_owned(), START_TIME.elapsed());
    for (label, duration) in &timings {
        println!("timing.{label}: {duration:?}");
    }
}
