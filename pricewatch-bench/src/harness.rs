//! Timing runs over the three catalog indexes.
//!
//! Lookups are sampled rather than run N times; the sampled mean is
//! projected to N operations so every row compares against the same N.

use crate::mock::generate_records;
use pricewatch_catalog::{AlphaIndex, CheapestIndex, PriceIndex, SharedRecord};
use pricewatch_store::app_config::BenchConfig;
use rand::Rng;
use std::hint::black_box;
use std::time::{Duration, Instant};

pub const CSV_HEADER: &str = "structure,operation,n,time_ns,time_ms";

#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub structure: &'static str,
    pub operation: &'static str,
    pub n: usize,
    pub elapsed: Duration,
}

impl Measurement {
    pub fn csv_row(&self) -> String {
        format!(
            "{},{},{},{},{:.3}",
            self.structure,
            self.operation,
            self.n,
            self.elapsed.as_nanos(),
            self.elapsed.as_secs_f64() * 1_000.0
        )
    }
}

fn timed<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let out = f();
    (out, start.elapsed())
}

pub fn bench_alpha<R: Rng>(
    records: &[SharedRecord],
    samples: usize,
    rng: &mut R,
) -> Vec<Measurement> {
    let n = records.len();
    let (index, insert) = timed(|| AlphaIndex::from_records(records.iter().cloned()));

    let mut out = vec![Measurement {
        structure: "AVL",
        operation: "insert",
        n,
        elapsed: insert,
    }];

    if n > 0 && samples > 0 {
        let targets: Vec<&str> = (0..samples)
            .map(|_| records[rng.gen_range(0..n)].title())
            .collect();
        let ((), lookups) = timed(|| {
            for title in &targets {
                black_box(index.lookup_exact(title));
            }
        });

        let per_op = lookups.as_secs_f64() / samples as f64;
        out.push(Measurement {
            structure: "AVL",
            operation: "lookup_projected",
            n,
            elapsed: Duration::from_secs_f64(per_op * n as f64),
        });
    }

    out
}

pub fn bench_price(records: &[SharedRecord], min: f64, max: f64) -> Vec<Measurement> {
    let n = records.len();
    let (index, insert) = timed(|| PriceIndex::from_records(records.iter().cloned()));
    let (hits, range) = timed(|| index.range_query(min, max));
    black_box(hits);

    vec![
        Measurement {
            structure: "BST",
            operation: "insert",
            n,
            elapsed: insert,
        },
        Measurement {
            structure: "BST",
            operation: "range_query",
            n,
            elapsed: range,
        },
    ]
}

pub fn bench_cheapest(records: &[SharedRecord], top_n: usize) -> Vec<Measurement> {
    let n = records.len();
    let (heap, insert) = timed(|| {
        let mut heap = CheapestIndex::new();
        for record in records {
            heap.insert(record.clone());
        }
        heap
    });
    let (top, extract) = timed(|| heap.top_n(top_n));
    black_box(top);

    vec![
        Measurement {
            structure: "Heap",
            operation: "insert",
            n,
            elapsed: insert,
        },
        Measurement {
            structure: "Heap",
            operation: "top_n",
            n,
            elapsed: extract,
        },
    ]
}

/// Generate `n` mock records and time every structure against them
pub fn run_size<R: Rng>(n: usize, config: &BenchConfig, rng: &mut R) -> Vec<Measurement> {
    let records = generate_records(n, rng);

    let mut out = bench_alpha(&records, config.lookup_samples, rng);
    out.extend(bench_price(&records, config.range_min, config.range_max));
    out.extend(bench_cheapest(&records, config.top_n));
    out
}
