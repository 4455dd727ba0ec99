//! Command-line interface definitions using clap derive macros.
//!
//! http-echo has no subcommands: every option lives on [`Cli`], and each
//! one has an environment variable equivalent for container deployments.

use clap::{Parser, ValueEnum};

use crate::version;

#[derive(Parser, Debug)]
#[command(
    name = "http-echo",
    version = version::DISPLAY_VERSION,
    about = "HTTP echo server with structured access logs",
    after_help = "\x1b[1mExamples:\x1b[0m\n  \
        http-echo --text hello                        Echo 'hello' on :5678\n  \
        http-echo --text gone --status-code 410       Answer every request with 410\n  \
        ECHO_TEXT=hi http-echo --listen 127.0.0.1:8080 --access-log json"
)]
pub struct Cli {
    /// Address and port to listen on (`:port` binds all interfaces)
    #[arg(long, env = "LISTEN", default_value = ":5678")]
    pub listen: String,

    /// Text to put on the webpage
    #[arg(long, env = "ECHO_TEXT")]
    pub text: Option<String>,

    /// HTTP status code for echo responses, e.g. 200
    #[arg(long, env = "STATUS_CODE", default_value_t = 200)]
    pub status_code: u16,

    /// Value of the X-App-Name response header
    #[arg(long, env = "APP_NAME", default_value = version::NAME)]
    pub app_name: String,

    /// Value of the X-App-Version response header
    #[arg(long, env = "APP_VERSION", default_value = version::VERSION)]
    pub app_version: String,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,

    /// Where access records go. Both sinks honor --log-level: records are
    /// INFO, so `warn` or `error` silences them
    #[arg(long, env = "ACCESS_LOG", default_value = "json")]
    pub access_log: AccessLogFormat,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AccessLogFormat {
    /// INFO event through the application logger, headers in one field
    Tracing,
    /// One JSON object per line on stdout, every attribute top-level
    Json,
}
