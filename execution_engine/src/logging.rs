//! Logging via the tracing crate.
use std::io;

use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Settings used to initialize the global subscriber.
#[derive(Clone, Copy, Debug)]
pub struct Settings {
    max_level: LevelFilter,
    style: Style,
}

impl Settings {
    /// Constructs new `Settings`, where `max_level` sets the verbosity level above which messages
    /// will be filtered out.
    ///
    /// `OFF` is the lowest level, through `ERROR`, `WARN`, `INFO`, `DEBUG` to `TRACE` at the
    /// highest level. The logging style defaults to [`Style::Structured`]. A `RUST_LOG`
    /// directive in the environment takes precedence over `max_level`.
    pub fn new(max_level: LevelFilter) -> Self {
        Settings {
            max_level,
            style: Style::Structured,
        }
    }

    /// Sets the logging style to structured or human-readable.
    #[must_use]
    pub fn with_style(mut self, value: Style) -> Self {
        self.style = value;
        self
    }

    pub(crate) fn max_level(&self) -> LevelFilter {
        self.max_level
    }

    pub(crate) fn style(&self) -> Style {
        self.style
    }
}

/// The style of generated log messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    /// One JSON object per event.
    Structured,
    /// Human-readable log-messages.
    HumanReadable,
}

fn env_filter(settings: &Settings) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(settings.max_level().into())
        .from_env_lossy()
}

/// Initializes the global subscriber.
///
/// Call this once during the lifetime of the application; the installed subscriber is global and
/// a second call returns an error.
pub fn initialize(settings: Settings) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_writer(io::stdout)
        .with_env_filter(env_filter(&settings));

    match settings.style() {
        Style::Structured => tracing::subscriber::set_global_default(builder.json().finish())?,
        Style::HumanReadable => tracing::subscriber::set_global_default(builder.finish())?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_structured() {
        let settings = Settings::new(LevelFilter::DEBUG);
        assert_eq!(settings.style(), Style::Structured);
        assert_eq!(settings.max_level(), LevelFilter::DEBUG);
        let settings = settings.with_style(Style::HumanReadable);
        assert_eq!(settings.style(), Style::HumanReadable);
    }

    #[test]
    fn second_initialization_fails() {
        let settings = Settings::new(LevelFilter::WARN).with_style(Style::HumanReadable);
        let _ = initialize(settings);
        assert!(initialize(settings).is_err());
    }
}
