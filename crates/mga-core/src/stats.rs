//! Run statistics.

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// Counters, non-fatal errors and timing of one analyzer run.
#[derive(Debug, Clone, Default)]
pub struct Stats {
    pub resources: u64,
    pub failed_resources: u64,
    pub attributes: u64,
    pub sensitive: u64,
    pub operations: u64,
    pub parameters: u64,
    pub capabilities: u64,
    pub relationships: u64,
    pub errors: Vec<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    started: Option<Instant>,
    elapsed: Duration,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.started = Some(Instant::now());
        self.started_at = Some(Utc::now());
    }

    /// Stop the clock. Stopping twice keeps the first measurement.
    pub fn stop(&mut self) {
        if let Some(started) = self.started.take() {
            self.elapsed = started.elapsed();
            self.finished_at = Some(Utc::now());
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Elapsed time as `mm:ss`.
    pub fn human_readable_duration(&self) -> String {
        let seconds = self.elapsed.as_secs();
        format!("{:02}:{:02}", (seconds % 3600) / 60, seconds % 60)
    }

    /// Counters of the summary with their labels, in display order.
    pub fn counters(&self) -> [(u64, &'static str); 7] {
        [
            (self.resources, "resources"),
            (self.attributes, "attributes"),
            (self.sensitive, "sensitive constraints"),
            (self.operations, "operations"),
            (self.parameters, "request properties"),
            (self.capabilities, "capabilities and"),
            (self.relationships, "relationships"),
        ]
    }
}

/// Group digits by thousands: `1234567` becomes `1,234,567`.
pub fn grouped(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Successfully created")?;
        for (count, label) in self.counters() {
            writeln!(f, "\t{:>8} {}", grouped(count), label)?;
        }
        if self.failed_resources > 0 {
            writeln!(
                f,
                "\t{:>8} resources could not be processed.",
                grouped(self.failed_resources)
            )?;
        }
        write!(f, "in {} seconds.", self.human_readable_duration())?;
        if !self.errors.is_empty() {
            write!(f, "\n\nErrors")?;
            for error in &self.errors {
                write!(f, "\n{error}")?;
            }
        }
        Ok(())
    }
}
