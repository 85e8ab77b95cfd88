//! Structured JSONL logging for harness runs.
//!
//! Provides:
//! - [`LogEntry`]: one JSONL record with required + optional fields.
//! - [`LogEmitter`]: writes records to a file, stdout or any writer.
//! - [`validate_log_line`] / [`validate_log_file`]: schema checks.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use gcmt::WtTime;
use serde::{Deserialize, Serialize};

/// Prefix of every trace id this crate generates.
pub const TRACE_PREFIX: &str = "gcmt";

// ---------------------------------------------------------------------------
// Log entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
    Error,
    Timeout,
}

/// Canonical structured log entry.
///
/// Required fields: `timestamp`, `trace_id`, `level`, `event`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    // Required
    pub timestamp: String,
    pub trace_id: String,
    pub level: LogLevel,
    pub event: String,

    // Optional
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    /// Compiled-in back-end (`pthread` or `portable`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errno: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ns: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl LogEntry {
    /// Create a new log entry with required fields only.
    #[must_use]
    pub fn new(trace_id: impl Into<String>, level: LogLevel, event: impl Into<String>) -> Self {
        Self {
            timestamp: rfc3339(gcmt::now()),
            trace_id: trace_id.into(),
            level,
            event: event.into(),
            scenario: None,
            backend: None,
            outcome: None,
            errno: None,
            latency_ns: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_scenario(mut self, scenario: impl Into<String>) -> Self {
        self.scenario = Some(scenario.into());
        self
    }

    #[must_use]
    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    #[must_use]
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    #[must_use]
    pub fn with_errno(mut self, errno: i32) -> Self {
        self.errno = Some(errno);
        self
    }

    #[must_use]
    pub fn with_latency_ns(mut self, ns: u64) -> Self {
        self.latency_ns = Some(ns);
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Serialize to a single JSON line (no trailing newline).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// Log emitter
// ---------------------------------------------------------------------------

/// Writes JSONL entries, assigning `gcmt::<run_id>::<seq>` trace ids.
pub struct LogEmitter<W: Write> {
    writer: W,
    seq: u64,
    run_id: String,
}

impl LogEmitter<BufWriter<File>> {
    pub fn to_file(path: &Path, run_id: &str) -> std::io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file), run_id))
    }
}

impl LogEmitter<std::io::Stdout> {
    #[must_use]
    pub fn to_stdout(run_id: &str) -> Self {
        Self::new(std::io::stdout(), run_id)
    }
}

impl<W: Write> LogEmitter<W> {
    pub fn new(writer: W, run_id: &str) -> Self {
        Self {
            writer,
            seq: 0,
            run_id: run_id.to_string(),
        }
    }

    fn next_trace_id(&mut self) -> String {
        self.seq += 1;
        format!("{TRACE_PREFIX}::{}::{:03}", self.run_id, self.seq)
    }

    /// Emit a bare event with an auto-generated trace id.
    pub fn emit(&mut self, level: LogLevel, event: &str) -> std::io::Result<LogEntry> {
        let entry = LogEntry::new(self.next_trace_id(), level, event);
        self.write_entry(&entry)?;
        Ok(entry)
    }

    /// Emit a populated entry; an empty trace id is filled in.
    pub fn emit_entry(&mut self, mut entry: LogEntry) -> std::io::Result<()> {
        if entry.trace_id.is_empty() {
            entry.trace_id = self.next_trace_id();
        }
        self.write_entry(&entry)
    }

    fn write_entry(&mut self, entry: &LogEntry) -> std::io::Result<()> {
        let line = entry.to_jsonl().map_err(std::io::Error::other)?;
        writeln!(self.writer, "{line}")
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct LogValidationError {
    pub line_number: usize,
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for LogValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {}: field '{}': {}",
            self.line_number, self.field, self.message
        )
    }
}

/// Validate a single JSONL line against the schema.
pub fn validate_log_line(
    line: &str,
    line_number: usize,
) -> Result<LogEntry, Vec<LogValidationError>> {
    let mut errors = Vec::new();
    let mut fail = |field: &str, message: String| {
        errors.push(LogValidationError {
            line_number,
            field: field.to_string(),
            message,
        });
    };

    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            fail("<json>", format!("invalid JSON: {e}"));
            return Err(errors);
        }
    };
    let Some(obj) = value.as_object() else {
        fail("<root>", "expected JSON object".to_string());
        return Err(errors);
    };

    for field in ["timestamp", "trace_id", "level", "event"] {
        if !obj.contains_key(field) {
            fail(field, "required field missing".to_string());
        }
    }

    if let Some(level) = obj.get("level").and_then(|v| v.as_str())
        && !["trace", "debug", "info", "warn", "error"].contains(&level)
    {
        fail("level", format!("invalid level: '{level}'"));
    }

    if let Some(outcome) = obj.get("outcome").and_then(|v| v.as_str())
        && !["pass", "fail", "error", "timeout"].contains(&outcome)
    {
        fail("outcome", format!("invalid outcome: '{outcome}'"));
    }

    if let Some(backend) = obj.get("backend").and_then(|v| v.as_str())
        && !["pthread", "portable"].contains(&backend)
    {
        fail("backend", format!("invalid backend: '{backend}'"));
    }

    if let Some(trace_id) = obj.get("trace_id").and_then(|v| v.as_str())
        && trace_id.split("::").count() != 3
    {
        fail(
            "trace_id",
            format!("trace_id should follow <prefix>::<run_id>::<seq> format, got: '{trace_id}'"),
        );
    }

    // A scenario result must say how it went.
    if obj.contains_key("scenario") && !obj.contains_key("outcome") {
        fail("outcome", "scenario entries must include an outcome".to_string());
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    serde_json::from_value::<LogEntry>(value).map_err(|e| {
        vec![LogValidationError {
            line_number,
            field: "<deserialization>".to_string(),
            message: format!("failed to deserialize: {e}"),
        }]
    })
}

/// Validate an entire JSONL file.
///
/// Returns the non-empty line count and every validation error found.
pub fn validate_log_file(path: &Path) -> Result<(usize, Vec<LogValidationError>), std::io::Error> {
    let content = std::fs::read_to_string(path)?;
    let mut all_errors = Vec::new();
    let mut line_count = 0;

    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        line_count += 1;
        if let Err(errs) = validate_log_line(line, i + 1) {
            all_errors.extend(errs);
        }
    }

    Ok((line_count, all_errors))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `YYYY-MM-DDTHH:MM:SS.mmmZ` for a wall-clock instant.
#[must_use]
pub fn rfc3339(t: WtTime) -> String {
    let ts = t.to_timespec();
    let days = ts.tv_sec.div_euclid(86_400);
    let secs = ts.tv_sec.rem_euclid(86_400);
    let (year, month, day) = civil_from_days(days);
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}.{:03}Z",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60,
        ts.tv_nsec / 1_000_000,
    )
}

// Proleptic Gregorian date for a day count relative to 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_entry_serializes_required_fields() {
        let entry = LogEntry::new("gcmt::run-1::001", LogLevel::Info, "run_start");
        let json = entry.to_jsonl().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed["timestamp"].is_string());
        assert_eq!(parsed["trace_id"], "gcmt::run-1::001");
        assert_eq!(parsed["level"], "info");
        assert_eq!(parsed["event"], "run_start");
        assert!(parsed.get("scenario").is_none());
        assert!(parsed.get("outcome").is_none());
    }

    #[test]
    fn log_entry_with_optional_fields() {
        let entry = LogEntry::new("gcmt::run-1::002", LogLevel::Error, "scenario_result")
            .with_scenario("mutex_trylock")
            .with_backend("pthread")
            .with_outcome(Outcome::Fail)
            .with_errno(16)
            .with_latency_ns(150)
            .with_details(serde_json::json!({"expected": "busy"}));
        let parsed: serde_json::Value = serde_json::from_str(&entry.to_jsonl().unwrap()).unwrap();
        assert_eq!(parsed["scenario"], "mutex_trylock");
        assert_eq!(parsed["backend"], "pthread");
        assert_eq!(parsed["outcome"], "fail");
        assert_eq!(parsed["errno"], 16);
        assert_eq!(parsed["latency_ns"], 150);
        assert_eq!(parsed["details"]["expected"], "busy");
    }

    #[test]
    fn emitter_numbers_trace_ids() {
        let mut emitter = LogEmitter::new(Vec::new(), "r7");
        emitter.emit(LogLevel::Info, "a").unwrap();
        emitter
            .emit_entry(
                LogEntry::new("", LogLevel::Info, "b")
                    .with_scenario("s")
                    .with_outcome(Outcome::Pass),
            )
            .unwrap();
        let out = String::from_utf8(emitter.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let first = validate_log_line(lines[0], 1).unwrap();
        let second = validate_log_line(lines[1], 2).unwrap();
        assert_eq!(first.trace_id, "gcmt::r7::001");
        assert_eq!(second.trace_id, "gcmt::r7::002");
    }

    #[test]
    fn validation_reports_missing_and_bad_fields() {
        let errs = validate_log_line(r#"{"trace_id":"x","level":"loud"}"#, 3).unwrap_err();
        let fields: Vec<&str> = errs.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"timestamp"));
        assert!(fields.contains(&"event"));
        assert!(fields.contains(&"level"));
        assert!(fields.contains(&"trace_id"));
        assert!(errs.iter().all(|e| e.line_number == 3));
    }

    #[test]
    fn validation_rejects_non_objects() {
        assert_eq!(validate_log_line("[]", 1).unwrap_err()[0].field, "<root>");
        assert_eq!(validate_log_line("{", 1).unwrap_err()[0].field, "<json>");
    }

    #[test]
    fn scenario_without_outcome_is_invalid() {
        let line = LogEntry::new("gcmt::r::001", LogLevel::Info, "e")
            .with_scenario("s")
            .to_jsonl()
            .unwrap();
        let errs = validate_log_line(&line, 1).unwrap_err();
        assert_eq!(errs[0].field, "outcome");
    }

    #[test]
    fn timestamps_are_calendar_dates() {
        assert_eq!(rfc3339(WtTime::from_unix(0, 0)), "1970-01-01T00:00:00.000Z");
        assert_eq!(
            rfc3339(WtTime::from_unix(1_704_067_200, 123_456)),
            "2024-01-01T00:00:00.123Z"
        );
        assert_eq!(
            rfc3339(WtTime::from_unix(951_825_600, 0)),
            "2000-02-29T12:00:00.000Z"
        );
        assert_eq!(rfc3339(WtTime::ZERO), "1601-01-01T00:00:00.000Z");
    }
}
