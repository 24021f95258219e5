use {
    anyhow::Result,
    std::{
        fs::File,
        path::Path,
        sync::Arc,
    },
    tracing::Level,
    tracing_subscriber::{
        fmt::{
            layer,
            writer::MakeWriterExt,
        },
        layer::SubscriberExt,
        util::SubscriberInitExt,
    },
};

/// Route tracing events to a log file and, optionally, to stdout.
///
/// The file keeps a plain record of the run next to its data; stdout is
/// for watching a run live and stays silent when `stdout_level` is
/// `None`.
pub fn setup_logging(
    path: &dyn AsRef<Path>,
    file_level: Level,
    stdout_level: Option<Level>,
) -> Result<()> {
    let log_file = Arc::new(File::create(path)?);

    let file_layer = layer()
        .with_writer(log_file.with_max_level(file_level))
        .with_ansi(false);

    let stdout_layer = stdout_level.map(|level| {
        layer()
            .with_writer(std::io::stdout.with_max_level(level))
            .pretty()
            .with_line_number(true)
            .with_thread_ids(false)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(())
}
