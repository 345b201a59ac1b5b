use elogie_core::config::{LogFormat, LoggingConfig};
use tracing::{Level, Subscriber};
use tracing_subscriber::fmt::MakeWriter;

/// Builds the fmt subscriber for `logging`, sending every event to `writer`.
pub fn subscriber<W>(logging: &LoggingConfig, writer: W) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let level = logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder =
        tracing_subscriber::fmt().with_target(false).with_max_level(level).with_writer(writer);

    match logging.format {
        LogFormat::Compact => Box::new(builder.compact().finish()),
        LogFormat::Pretty => Box::new(builder.pretty().finish()),
        LogFormat::Json => Box::new(builder.json().finish()),
    }
}

/// Installs the process-wide subscriber on stderr; stdout carries the command's JSON outcome.
pub fn init(logging: &LoggingConfig) {
    // A second install (tests, repeated calls) keeps the first subscriber.
    let _ = tracing::subscriber::set_global_default(subscriber(logging, std::io::stderr));
}
