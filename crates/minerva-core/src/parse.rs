//! Log line classification and field extraction.
//!
//! The classifier is a pure substring predicate over the raw line; the
//! extractor pulls labeled tokens out with independent regular expressions.
//! All patterns are compiled once into statics — extraction runs on the
//! pipeline hot path.

use std::sync::LazyLock;

use regex::Regex;

use crate::event::{LogEvent, UNKNOWN};

/// Reason tokens that mark a dropped packet as worth keeping.
const SUSPICIOUS_REASONS: [&str; 4] = [
    "POLICY-INPUT-GEN-DISCARD",
    "PORTSCAN",
    "INTRUSION-DETECTED",
    "MALFORMED-PACKET",
];

static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:\d{2})?")
        .expect("timestamp regex should compile")
});

static SRC_IP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"SRC=((?:\d{1,3}\.){3}\d{1,3}|[A-Fa-f0-9:]+)").expect("SRC regex should compile")
});

static DST_IP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"DST=((?:\d{1,3}\.){3}\d{1,3}|[A-Fa-f0-9:]+)").expect("DST regex should compile")
});

static SRC_PORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"SPT=(\d+)").expect("SPT regex should compile"));

static DST_PORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"DPT=(\d+)").expect("DPT regex should compile"));

static PROTOCOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"PROTO=(\w+)").expect("PROTO regex should compile"));

static ACTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"action=(\w+)").expect("action regex should compile"));

static REASON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"reason=([\w-]+)").expect("reason regex should compile"));

static PACKET_LENGTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"LEN=(\d+)").expect("LEN regex should compile"));

static TTL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"TTL=(\d+)").expect("TTL regex should compile"));

/// Check whether a log line indicates a potential threat.
///
/// True iff the line records a dropped packet (`action=DROP`) with one of the
/// suspicious reason tokens. Operates on the raw line; no tokenization.
pub fn is_suspicious(line: &str) -> bool {
    line.contains("action=DROP") && SUSPICIOUS_REASONS.iter().any(|r| line.contains(r))
}

/// Extract a structured [`LogEvent`] from a log line.
///
/// Never fails: fields whose pattern is absent fall back to [`UNKNOWN`] for
/// text and `0` for integers. Numeric tokens that overflow an `i32` also
/// yield `0`.
pub fn extract(line: &str) -> LogEvent {
    LogEvent {
        timestamp: TIMESTAMP_RE
            .find(line)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| UNKNOWN.to_string()),
        source_ip: capture_text(&SRC_IP_RE, line),
        destination_ip: capture_text(&DST_IP_RE, line),
        protocol: capture_text(&PROTOCOL_RE, line),
        source_port: capture_int(&SRC_PORT_RE, line),
        destination_port: capture_int(&DST_PORT_RE, line),
        action: capture_text(&ACTION_RE, line),
        reason: capture_text(&REASON_RE, line),
        packet_length: capture_int(&PACKET_LENGTH_RE, line),
        ttl: capture_int(&TTL_RE, line),
    }
}

fn capture_text(re: &Regex, line: &str) -> String {
    re.captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn capture_int(re: &Regex, line: &str) -> i32 {
    re.captures(line)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}
