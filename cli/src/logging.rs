use std::panic;
use std::path::Path;

use anyhow::Result;
use tracing::error;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing: daily rotated files in `log_dir` if given, stderr
/// otherwise. `RUST_LOG` overrides the default `warn` level.
pub fn setup_tracing(log_dir: Option<&Path>) -> Result<()> {
    let file_layer = log_dir.map(|dir| {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, "btcstats.log");
        fmt::layer().with_ansi(false).with_writer(file_appender)
    });
    let stderr_layer = log_dir
        .is_none()
        .then(|| fmt::layer().with_writer(std::io::stderr));
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .with(filter)
        .try_init()?;

    Ok(())
}

/// Make sure tracing is able to log panics occurring in command tasks
pub fn setup_panic_hook() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        error!("Application panicked!");
        error!("Panic info: {:?}", panic_info);
        error!("Backtrace: {:?}", backtrace);
        default_hook(panic_info);
    }));
}
