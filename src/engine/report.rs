use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use super::channel::MessageChannel;
use crate::error::AppError;

// =============================================================================
// Dated artifacts
// =============================================================================

/// Deterministic artifact name for a run date: `YYYY-MM-DD_<kind>.<ext>`.
pub fn dated_name(date: NaiveDate, kind: &str, ext: &str) -> String {
    format!("{}_{kind}.{ext}", date.format("%Y-%m-%d"))
}

fn open_append(path: &Path) -> Result<(std::fs::File, bool), AppError> {
    let existed = path.exists() && std::fs::metadata(path)?.len() > 0;
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok((file, existed))
}

/// Append rows to the dated CSV for `kind`, writing the header only when
/// the file is new. Existing content is never overwritten.
pub fn append_csv(
    dir: &Path,
    date: NaiveDate,
    kind: &str,
    header: &[&str],
    rows: &[Vec<String>],
) -> Result<PathBuf, AppError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(dated_name(date, kind, "csv"));
    let (file, existed) = open_append(&path)?;

    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    if !existed {
        writer.write_record(header)?;
    }
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    tracing::info!(path = %path.display(), rows = rows.len(), "CSV artifact written");
    Ok(path)
}

/// Append a block of text to the dated text artifact for `kind`.
pub fn append_text(
    dir: &Path,
    date: NaiveDate,
    kind: &str,
    content: &str,
) -> Result<PathBuf, AppError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(dated_name(date, kind, "txt"));
    let (mut file, _) = open_append(&path)?;
    file.write_all(content.as_bytes())?;

    tracing::info!(path = %path.display(), "Text artifact written");
    Ok(path)
}

// =============================================================================
// Message emission
// =============================================================================

/// One rendered output bound for a recipient.
#[derive(Debug, Clone)]
pub struct Outgoing {
    /// Record identity (customer email, contact name).
    pub target: String,
    pub text: String,
}

/// Per-output delivery outcome.
#[derive(Debug)]
pub struct DeliveryOutcome {
    pub target: String,
    pub error: Option<String>,
}

impl DeliveryOutcome {
    pub fn delivered(&self) -> bool {
        self.error.is_none()
    }
}

/// Send every output through the channel. A failed recipient is recorded
/// and the batch continues; nothing is retried or rolled back here.
pub fn emit_messages(outputs: &[Outgoing], channel: &dyn MessageChannel) -> Vec<DeliveryOutcome> {
    let mut outcomes = Vec::with_capacity(outputs.len());
    for out in outputs {
        match channel.send(&out.target, &out.text) {
            Ok(()) => outcomes.push(DeliveryOutcome { target: out.target.clone(), error: None }),
            Err(e) => {
                tracing::warn!(recipient = %out.target, error = %e, "Delivery failed");
                outcomes.push(DeliveryOutcome {
                    target: out.target.clone(),
                    error: Some(e.to_string()),
                });
            }
        }
    }
    outcomes
}

// =============================================================================
// Run summary
// =============================================================================

/// End-of-run accounting. Always produced, even on partial failure.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub label: String,
    pub records_read: usize,
    pub dropped_malformed: usize,
    pub insufficient_data: usize,
    pub eligible: usize,
    pub artifacts: Vec<PathBuf>,
    pub delivered: usize,
    pub failed_deliveries: Vec<(String, String)>,
}

impl RunSummary {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into(), ..Default::default() }
    }

    pub fn absorb_deliveries(&mut self, outcomes: &[DeliveryOutcome]) {
        for o in outcomes {
            match &o.error {
                None => self.delivered += 1,
                Some(e) => self.failed_deliveries.push((o.target.clone(), e.clone())),
            }
        }
    }

    /// Human-readable wrap-up printed at the end of every run.
    pub fn render(&self) -> String {
        let mut lines = vec![format!("== {} summary ==", self.label)];
        lines.push(format!("records read:       {}", self.records_read));
        if self.dropped_malformed > 0 {
            lines.push(format!("malformed, dropped: {}", self.dropped_malformed));
        }
        if self.insufficient_data > 0 {
            lines.push(format!("insufficient data:  {}", self.insufficient_data));
        }
        lines.push(format!("eligible:           {}", self.eligible));
        for path in &self.artifacts {
            lines.push(format!("wrote {}", path.display()));
        }
        if self.delivered > 0 || !self.failed_deliveries.is_empty() {
            lines.push(format!("delivered:          {}", self.delivered));
        }
        for (target, error) in &self.failed_deliveries {
            lines.push(format!("FAILED {target}: {error}"));
        }
        lines.join("\n")
    }
}
