//! Harvest progress reporting.
//!
//! Reports how far a `harvest run` has walked the identifier range so an
//! operator can see what is left without reading the log. Progress is
//! emitted on **stderr** so stdout remains parseable for scripts.

use std::io::Write;

/// A single progress event for a harvest run.
#[derive(Clone, Debug)]
pub enum HarvestProgressEvent {
    /// Logging in to the portal. Nothing fetched yet.
    Authenticating { portal: String },
    /// `n` identifiers processed out of `total`; `saved` of them stored.
    Harvesting {
        uid: i64,
        n: u64,
        total: u64,
        saved: u64,
    },
}

/// Reports harvest progress. Implementations write to stderr (human or JSON).
pub trait HarvestProgressReporter: Send + Sync {
    /// Emit a progress event. Called from the harvester loop.
    fn report(&self, event: HarvestProgressEvent);
}

/// Human-friendly progress on stderr: "harvest  1,234 / 11,200 ids  (saved 800, at uid 16234)".
pub struct StderrProgress;

impl HarvestProgressReporter for StderrProgress {
    fn report(&self, event: HarvestProgressEvent) {
        let line = match &event {
            HarvestProgressEvent::Authenticating { portal } => {
                format!("harvest  logging in to {}...\n", portal)
            }
            HarvestProgressEvent::Harvesting {
                uid,
                n,
                total,
                saved,
            } => format!(
                "harvest  {} / {} ids  (saved {}, at uid {})\n",
                format_number(*n),
                format_number(*total),
                format_number(*saved),
                uid
            ),
        };
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl HarvestProgressReporter for JsonProgress {
    fn report(&self, event: HarvestProgressEvent) {
        let obj = match &event {
            HarvestProgressEvent::Authenticating { portal } => serde_json::json!({
                "event": "progress",
                "phase": "authenticating",
                "portal": portal
            }),
            HarvestProgressEvent::Harvesting {
                uid,
                n,
                total,
                saved,
            } => serde_json::json!({
                "event": "progress",
                "phase": "harvesting",
                "uid": uid,
                "n": n,
                "total": total,
                "saved": saved
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
            let _ = stderr.flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl HarvestProgressReporter for NoProgress {
    fn report(&self, _event: HarvestProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Build a reporter for this mode.
    pub fn reporter(&self) -> Box<dyn HarvestProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
