//! Server startup.
//!
//! Validates the configuration, initializes logging, binds the listener
//! and serves until a shutdown signal arrives.

use std::io::{self, Write};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::cli::{AccessLogFormat, Cli, LogLevel};
use crate::config::Config;
use crate::error::EchoError;
use crate::logging;
use crate::middleware::{JsonSink, RecordSink, TracingSink};
use crate::server;
use crate::version;

pub async fn execute(cli: Cli) -> Result<(), EchoError> {
    let config = Config::from_cli(&cli)?;

    let log_format = logging::resolve_format(cli.pretty, cli.json);
    logging::init(&cli.log_level, log_format);

    let sink = record_sink(config.access_log, &cli.log_level, io::stdout());
    let router = server::build_router(&config, sink);
    let listener = tokio::net::TcpListener::bind(config.listen).await?;

    tracing::info!(
        addr = %config.listen,
        version = %version::human_version(),
        status_code = config.status_code.as_u16(),
        "server is listening"
    );

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(server::shutdown_signal())
    .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Select the access record sink. JSON records go to `out`, filtered by
/// the same level as the application logger.
pub fn record_sink<W>(format: AccessLogFormat, level: &LogLevel, out: W) -> Arc<dyn RecordSink>
where
    W: Write + Send + 'static,
{
    match format {
        AccessLogFormat::Tracing => Arc::new(TracingSink),
        AccessLogFormat::Json => {
            Arc::new(JsonSink::new(out).with_max_level(level.to_tracing_level()))
        }
    }
}
