//! Command results, printable as text or JSON

use std::fmt;

use bitokpow_core::{
    BITOKPOW_PARAMS, DIGEST_SIZE, Digest, HEADER_SIZE, HashEngine, PowHash, Result,
    SCRATCHPAD_SIZE, TARGET_SIZE, TOTAL_MEMORY, Target, share_difficulty, verify_block_with,
};
use serde::Serialize;

use crate::benchmark::BenchmarkResult;

/// Passes digests through while keeping the last one
struct Recorder {
    engine: HashEngine,
    last: Option<Digest>,
}

impl PowHash for Recorder {
    fn digest(&mut self, input: &[u8]) -> Result<Digest> {
        let digest = self.engine.digest(input)?;
        self.last = Some(digest);
        Ok(digest)
    }
}

fn format_bits(bits: u32) -> String {
    format!("{bits:#010x}")
}

/// Difficulties can be infinite; JSON has no representation for that
fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[derive(Debug, Clone, Serialize)]
pub struct HashReport {
    pub input_len: usize,
    pub digest: String,
    pub share_difficulty: Option<f64>,
}

impl HashReport {
    pub fn new(input: &[u8], digest: &Digest) -> Self {
        Self {
            input_len: input.len(),
            digest: hex::encode(digest),
            share_difficulty: finite(share_difficulty(digest)),
        }
    }
}

impl fmt::Display for HashReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Input:  {} bytes", self.input_len)?;
        write!(f, "Digest: {}", self.digest)?;
        if let Some(difficulty) = self.share_difficulty {
            write!(f, "\nShare difficulty: {difficulty:.4}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub header: String,
    pub digest: String,
    pub target: String,
    pub bits: Option<String>,
    pub meets_target: bool,
}

impl VerifyReport {
    /// Verify `header` against `target`, keeping the digest for display
    pub fn run(header: &[u8], target: &[u8], bits: Option<u32>) -> Result<Self> {
        let mut recorder = Recorder {
            engine: HashEngine::new(),
            last: None,
        };
        let meets_target = verify_block_with(&mut recorder, header, target)?;

        Ok(Self {
            header: hex::encode(header),
            digest: recorder.last.map(hex::encode).unwrap_or_default(),
            target: hex::encode(target),
            bits: bits.map(format_bits),
            meets_target,
        })
    }
}

impl fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Digest: {}", self.digest)?;
        write!(f, "Target: {}", self.target)?;
        if let Some(bits) = &self.bits {
            write!(f, " (bits {bits})")?;
        }
        let verdict = if self.meets_target {
            "meets target"
        } else {
            "does not meet target"
        };
        write!(f, "\nResult: {verdict}")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    pub target: String,
    pub bits: String,
    pub difficulty: Option<f64>,
}

impl TargetReport {
    pub fn new(target: &Target) -> Self {
        Self {
            target: target.to_hex(),
            bits: format_bits(target.to_compact()),
            difficulty: finite(target.difficulty()),
        }
    }
}

impl fmt::Display for TargetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Target (LE hex): {}", self.target)?;
        writeln!(f, "Compact bits:    {}", self.bits)?;
        match self.difficulty {
            Some(difficulty) => write!(f, "Difficulty:      {difficulty:.8}"),
            None => write!(f, "Difficulty:      infinite"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
    pub hashes: u64,
    pub threads: usize,
    pub elapsed_secs: f64,
    pub hashrate: f64,
    pub best_digest: Option<String>,
    pub best_share_difficulty: Option<f64>,
}

impl From<&BenchmarkResult> for BenchmarkReport {
    fn from(result: &BenchmarkResult) -> Self {
        Self {
            hashes: result.hashes,
            threads: result.threads,
            elapsed_secs: result.elapsed.as_secs_f64(),
            hashrate: result.hashrate(),
            best_digest: result.best.map(hex::encode),
            best_share_difficulty: result.best.as_ref().and_then(|d| finite(share_difficulty(d))),
        }
    }
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Results:")?;
        writeln!(f, "  Total hashes: {}", self.hashes)?;
        writeln!(f, "  Threads: {}", self.threads)?;
        writeln!(f, "  Time elapsed: {:.2}s", self.elapsed_secs)?;
        write!(f, "  Hashrate: {:.2} H/s", self.hashrate)?;
        if let Some(best) = &self.best_digest {
            write!(f, "\n  Best digest: {best}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ParamsReport {
    pub algorithm: &'static str,
    pub n: u32,
    pub r: u32,
    pub personalization: String,
    pub scratchpad_bytes: usize,
    pub total_memory_bytes: usize,
    pub header_size: usize,
    pub target_size: usize,
    pub digest_size: usize,
}

impl ParamsReport {
    pub fn current() -> Self {
        Self {
            algorithm: "yespower 1.0",
            n: BITOKPOW_PARAMS.n(),
            r: BITOKPOW_PARAMS.r(),
            personalization: String::from_utf8_lossy(BITOKPOW_PARAMS.personalization())
                .into_owned(),
            scratchpad_bytes: SCRATCHPAD_SIZE,
            total_memory_bytes: TOTAL_MEMORY,
            header_size: HEADER_SIZE,
            target_size: TARGET_SIZE,
            digest_size: DIGEST_SIZE,
        }
    }
}

impl fmt::Display for ParamsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Algorithm parameters:")?;
        writeln!(f, "  Algorithm: {}", self.algorithm)?;
        writeln!(f, "  N: {}", self.n)?;
        writeln!(f, "  r: {}", self.r)?;
        writeln!(f, "  Personalization: {:?}", self.personalization)?;
        writeln!(f, "  Scratchpad: {} KB", self.scratchpad_bytes / 1024)?;
        writeln!(f, "  Total memory: {} KB", self.total_memory_bytes / 1024)?;
        write!(
            f,
            "  Header / target / digest: {} / {} / {} bytes",
            self.header_size, self.target_size, self.digest_size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitokpow_core::Error;
    use std::time::Duration;

    #[test]
    fn verify_report_keeps_digest() {
        let report = VerifyReport::run(&[0u8; 80], &[0xFF; 32], None).unwrap();
        assert!(report.meets_target);
        assert_eq!(
            report.digest,
            "95c974e0f4ba4a29553e03494400978f5847e7166015e906f8f43d87ab7ef4e2"
        );
        assert!(report.to_string().contains("meets target"));
    }

    #[test]
    fn verify_report_propagates_size_errors() {
        let err = VerifyReport::run(&[0u8; 79], &[0xFF; 32], None).unwrap_err();
        assert!(matches!(err, Error::InputSize { argument: "header", .. }));
    }

    #[test]
    fn target_report_formats_bits() {
        let target = Target::from_compact(0x1e7fffff).unwrap();
        let report = TargetReport::new(&target);
        assert_eq!(report.bits, "0x1e7fffff");
        assert!((report.difficulty.unwrap() - 1.0).abs() < 1e-12);

        let zero = TargetReport::new(&Target::from_le_bytes([0u8; 32]));
        assert_eq!(zero.difficulty, None);
        assert!(zero.to_string().contains("infinite"));
    }

    #[test]
    fn reports_serialize_to_json() {
        let report = HashReport::new(b"", &[0u8; 32]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["input_len"], 0);
        assert!(json["share_difficulty"].is_null());

        let params = serde_json::to_value(ParamsReport::current()).unwrap();
        assert_eq!(params["n"], 2048);
        assert_eq!(params["r"], 32);
        assert_eq!(params["personalization"], "BitokPoW");
        assert_eq!(params["scratchpad_bytes"], 8 * 1024 * 1024);
    }

    #[test]
    fn benchmark_report_from_result() {
        let result = BenchmarkResult {
            hashes: 4,
            threads: 2,
            elapsed: Duration::from_secs(2),
            best: Some([0x11; 32]),
        };
        let report = BenchmarkReport::from(&result);
        assert!((report.hashrate - 2.0).abs() < f64::EPSILON);
        assert_eq!(report.best_digest.as_deref(), Some("11".repeat(32).as_str()));
        assert!(report.best_share_difficulty.is_some());
    }
}
