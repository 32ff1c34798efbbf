//! Subscriber setup for the crate's `tracing` diagnostics.
//!
//! The library itself only emits events. Installing a subscriber is up to the
//! application; these helpers cover the common cases.
//!
//! ```bash
//! RUST_LOG=calendar_intervals=trace my_bin
//! ```
//!
//! `trace` shows every partition and every visit, `debug` shows descents and
//! traversal summaries, `error` shows visitor failures which were skipped.
//! If `CUSTOM_FILTER` is set and parses, it replaces `RUST_LOG` entirely.

use std::str::FromStr;

use tracing_subscriber::{
    filter::EnvFilter, fmt::MakeWriter, layer::SubscriberExt, util::SubscriberInitExt, Layer,
    Registry,
};

use derive_more::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
/// Sets the kind of structured logging output you want
pub enum Output {
    /// Regular logging (default)
    Log,
    /// More compact version of above
    Compact,
    /// Outputs everything as json
    Json,
    /// No logging to console
    None,
}

impl FromStr for Output {
    type Err = errors::TracingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Log" => Ok(Output::Log),
            "Compact" => Ok(Output::Compact),
            "Json" => Ok(Output::Json),
            "None" => Ok(Output::None),
            _ => Err(errors::TracingError::UnknownOutput(s.to_string())),
        }
    }
}

/// Run logging in a unit test.
///
/// RUST_LOG must be set or this is a no-op. Safe to call from many tests; only
/// the first call installs a subscriber.
pub fn test_run() -> Result<(), errors::TracingError> {
    if std::env::var_os("RUST_LOG").is_none() {
        return Ok(());
    }
    match init_fmt_with_opts(Output::Log, tracing_subscriber::fmt::TestWriter::new()) {
        Err(errors::TracingError::SetGlobal(_)) => Ok(()),
        r => r,
    }
}

/// Build the canonical filter based on env
pub fn standard_filter() -> EnvFilter {
    if std::env::var("CUSTOM_FILTER").is_ok() {
        match EnvFilter::try_from_env("CUSTOM_FILTER") {
            Ok(filter) => return filter,
            Err(e) => eprintln!("Failed to parse CUSTOM_FILTER {:?}", e),
        }
    }
    EnvFilter::from_default_env()
}

/// This checks RUST_LOG for a filter but doesn't complain if there is none or it doesn't parse.
/// It then checks for CUSTOM_FILTER which if set will output an error if it doesn't parse.
pub fn init_fmt(output: Output) -> Result<(), errors::TracingError> {
    init_fmt_with_opts(output, std::io::stderr)
}

fn init_fmt_with_opts<W>(output: Output, writer: W) -> Result<(), errors::TracingError>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let filter = standard_filter();
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_file(true)
        .with_line_number(true)
        .with_target(true);

    match output {
        Output::Log => Registry::default()
            .with(layer.with_filter(filter))
            .try_init()?,
        Output::Compact => Registry::default()
            .with(layer.compact().with_filter(filter))
            .try_init()?,
        Output::Json => Registry::default()
            .with(layer.json().with_filter(filter))
            .try_init()?,
        Output::None => (),
    }
    Ok(())
}

pub mod errors {
    //! Error in the tracing/logging framework

    use thiserror::Error;

    /// Error in the tracing/logging framework
    #[allow(missing_docs)] // should be self-explanatory
    #[derive(Error, Debug)]
    pub enum TracingError {
        #[error(transparent)]
        SetGlobal(#[from] tracing_subscriber::util::TryInitError),
        #[error("Could not parse log output type: {0}")]
        UnknownOutput(String),
    }
}
