//! Tracing subscriber setup used by the application.

use std::{env, sync::OnceLock};

use tracing_appender::{
    non_blocking,
    non_blocking::NonBlocking,
    rolling::{InitError, RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    EnvFilter,
    fmt::{fmt, time::ChronoLocal, writer::MakeWriterExt},
};

/// Guard to ensure buffered logs are flushed on shutdown.
static LOG_GUARD: OnceLock<non_blocking::WorkerGuard> = OnceLock::new();

pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let builder = fmt()
        .with_env_filter(env_filter)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(false)
        .with_level(true);

    let log_dir = env::var("LOG_DIR").ok();
    let file_writer = log_dir.as_deref().map(init_file_writer);
    let stdout = std::io::stdout.with_max_level(tracing::Level::INFO);

    match (json, file_writer) {
        (true, Some(Ok(file))) => builder.json().with_writer(stdout.and(file)).init(),
        (false, Some(Ok(file))) => builder.with_ansi(true).with_writer(stdout.and(file)).init(),
        (true, _) => builder.json().init(),
        (false, _) => builder.with_ansi(true).init(),
    }

    if let (Some(dir), None) = (&log_dir, LOG_GUARD.get()) {
        tracing::warn!(dir = %dir, "📝 ⚠️ Could not open log directory, logging to stdout only");
    }

    tracing::info!(json, "📝 Logger initialized");
}

fn init_file_writer(dir: &str) -> Result<NonBlocking, InitError> {
    let max_files = env::var("LOG_MAX_FILES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok());

    let mut file_builder = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("tierlist.log");

    if let Some(n) = max_files {
        file_builder = file_builder.max_log_files(n);
    }

    let file_appender = file_builder.build(dir)?;
    let (file_writer, guard) = non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    Ok(file_writer)
}
