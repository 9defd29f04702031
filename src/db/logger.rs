use anyhow::{Context, Result};
use flexi_logger::{Age, Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming};

use crate::settings::ServerSettings;

/// Start file logging with daily rotation. The returned handle must be kept
/// alive for the lifetime of the process.
pub fn init_logger(settings: &ServerSettings) -> Result<LoggerHandle> {
    std::fs::create_dir_all(&settings.log_dir).with_context(|| {
        format!("failed to create log directory {}", settings.log_dir.display())
    })?;

    let handle = Logger::try_with_str(&settings.log_level)?
        .log_to_file(
            FileSpec::default()
                .directory(&settings.log_dir)
                .basename("liga_bitacora")
                .suffix("log"),
        )
        .rotate(
            Criterion::Age(Age::Day),
            Naming::Numbers,
            Cleanup::KeepLogFiles(7),
        )
        .duplicate_to_stderr(Duplicate::Info)
        .start()?;

    Ok(handle)
}
