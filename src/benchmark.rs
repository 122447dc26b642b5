//! Multi-threaded hashrate benchmark
//!
//! Every worker owns its own [`HashEngine`]; nonces are interleaved across
//! workers (thread_id, thread_id + T, thread_id + 2T, ...) so the union of
//! hashed headers is the same for any thread count.

use std::time::{Duration, Instant};

use bitokpow_core::{Digest, Error, HEADER_SIZE, HashEngine, Result, meets_target};
use tracing::{debug, info};

/// Prefix of every benchmark header; the nonce fills the last four bytes
const HEADER_PREFIX: &[u8] = b"BitokPoW benchmark header";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchmarkConfig {
    /// Total digests across all threads
    pub count: u32,
    pub threads: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkResult {
    pub hashes: u64,
    pub threads: usize,
    pub elapsed: Duration,
    /// Lowest digest seen, if any were computed
    pub best: Option<Digest>,
}

impl BenchmarkResult {
    /// Hashes per second
    pub fn hashrate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.hashes as f64 / secs
    }
}

/// Build the benchmark header for `nonce`
pub fn benchmark_header(nonce: u32) -> [u8; HEADER_SIZE] {
    let mut header = [0u8; HEADER_SIZE];
    header[..HEADER_PREFIX.len()].copy_from_slice(HEADER_PREFIX);
    header[HEADER_SIZE - 4..].copy_from_slice(&nonce.to_le_bytes());
    header
}

fn lower(a: Option<Digest>, b: Option<Digest>) -> Option<Digest> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if meets_target(&a, &b) { a } else { b }),
        (a, b) => a.or(b),
    }
}

/// Hash the nonces assigned to one worker
fn worker(thread_id: usize, threads: usize, count: u32) -> Result<(u64, Option<Digest>)> {
    let mut engine = HashEngine::new();
    let mut hashes = 0u64;
    let mut best = None;

    for nonce in (thread_id as u64..count as u64).step_by(threads) {
        let digest = engine.digest(&benchmark_header(nonce as u32))?;
        best = lower(best, Some(digest));
        hashes += 1;
    }

    debug!(thread_id, hashes, "benchmark worker finished");
    Ok((hashes, best))
}

/// Run the benchmark on `config.threads` OS threads
pub fn run(config: &BenchmarkConfig) -> Result<BenchmarkResult> {
    if config.threads == 0 {
        return Err(Error::argument("benchmark needs at least one thread"));
    }

    info!(
        count = config.count,
        threads = config.threads,
        "starting benchmark"
    );
    let start = Instant::now();

    let outcomes = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..config.threads)
            .map(|thread_id| scope.spawn(move || worker(thread_id, config.threads, config.count)))
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| Error::computation("benchmark worker panicked"))
                    .and_then(|outcome| outcome)
            })
            .collect::<Result<Vec<_>>>()
    })?;

    let elapsed = start.elapsed();
    let (hashes, best) = outcomes
        .into_iter()
        .fold((0u64, None), |(total, best), (hashes, worker_best)| {
            (total + hashes, lower(best, worker_best))
        });

    let result = BenchmarkResult {
        hashes,
        threads: config.threads,
        elapsed,
        best,
    };
    info!(
        hashes,
        elapsed_ms = elapsed.as_millis() as u64,
        hashrate = result.hashrate(),
        "benchmark finished"
    );
    Ok(result)
}
