//! Tracing setup for the binaries
//!
//! Console output follows `RUST_LOG`. Warnings and errors, which includes
//! every reported diagnostic, are also appended to a plain-text log file.

use std::path::Path;

use tracing::level_filters::LevelFilter;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::error::{Result, TabiyaError};

/// WARN-and-above `fmt` layer appending to `path`.
///
/// The returned guard flushes the background writer when dropped; keep it
/// alive for as long as events should reach the file.
pub fn file_layer<S>(path: &Path) -> Result<(Box<dyn Layer<S> + Send + Sync>, WorkerGuard)>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|f| f.to_str())
        .ok_or_else(|| {
            TabiyaError::InvalidConfig(format!("log file has no file name: {}", path.display()))
        })?;

    std::fs::create_dir_all(dir)?;
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // no ANSI in files
        .with_target(false)
        .with_filter(LevelFilter::WARN)
        .boxed();
    Ok((layer, guard))
}

/// Install the console layer plus the log-file layer as the global subscriber
pub fn init(log_file: &Path) -> Result<WorkerGuard> {
    let (file, guard) = file_layer(log_file)?;
    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(EnvFilter::from_default_env()))
        .with(file)
        .init();
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{DiagnosticCode, Diagnostics};

    #[test]
    fn test_diagnostics_reach_the_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("debug.log");

        let (layer, guard) = file_layer(&path).unwrap();
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            let mut diags = Diagnostics::new();
            diags.warning("UUID Lineage", DiagnosticCode::LineageMiss, "No UUID found for 1234");
            diags.error("occupations_hierarchy.csv", "unknown concept type");
            tracing::info!("progress is not written to the file");
        });
        drop(guard);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("[W003] UUID Lineage: No UUID found for 1234"));
        assert!(content.contains("[E001] occupations_hierarchy.csv: unknown concept type"));
        assert!(!content.contains("progress"));
    }

    #[test]
    fn test_log_file_appends_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.log");

        for _ in 0..2 {
            let (layer, guard) = file_layer(&path).unwrap();
            tracing::subscriber::with_default(tracing_subscriber::registry().with(layer), || {
                let mut diags = Diagnostics::new();
                diags.warning("Skills", DiagnosticCode::UnknownSkill, "Skill key_9 is missing");
            });
            drop(guard);
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
