// /////////////////////////////////////////////////////////////////////////////
// Lakehouse Ingest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Application Configuration
//!
//! Bootstrap-phase configuration structure. `AppConfig` holds validated
//! configuration after CLI parsing, security validation, and default
//! application, and is immutable thereafter so it can be shared across
//! async tasks without synchronization.

use std::path::PathBuf;

/// Log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Immutable application configuration assembled from validated CLI input.
#[derive(Debug, Clone)]
pub struct AppConfig {
    app_name: String,
    log_level: LogLevel,
    input_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    worker_threads: Option<usize>,
    verbose: bool,
    dry_run: bool,
}

impl AppConfig {
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn input_path(&self) -> Option<&PathBuf> {
        self.input_path.as_ref()
    }

    pub fn output_path(&self) -> Option<&PathBuf> {
        self.output_path.as_ref()
    }

    pub fn worker_threads(&self) -> Option<usize> {
        self.worker_threads
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    app_name: Option<String>,
    log_level: Option<LogLevel>,
    input_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    worker_threads: Option<usize>,
    verbose: bool,
    dry_run: bool,
}

impl AppConfigBuilder {
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn worker_threads(mut self, count: usize) -> Self {
        self.worker_threads = Some(count);
        self
    }

    pub fn verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// # Panics
    /// Panics if `app_name` was not set.
    pub fn build(self) -> AppConfig {
        AppConfig {
            app_name: self.app_name.expect("app_name is required"),
            log_level: self.log_level.unwrap_or_default(),
            input_path: self.input_path,
            output_path: self.output_path,
            worker_threads: self.worker_threads,
            verbose: self.verbose,
            dry_run: self.dry_run,
        }
    }

    pub fn try_build(self) -> Result<AppConfig, String> {
        Ok(AppConfig {
            app_name: self.app_name.ok_or("app_name is required")?,
            log_level: self.log_level.unwrap_or_default(),
            input_path: self.input_path,
            output_path: self.output_path,
            worker_threads: self.worker_threads,
            verbose: self.verbose,
            dry_run: self.dry_run,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_builder_applies_defaults() {
        let config = AppConfig::builder().app_name("test-app").build();

        assert_eq!(config.app_name(), "test-app");
        assert_eq!(config.log_level(), LogLevel::Info);
        assert!(config.input_path().is_none());
        assert!(!config.is_verbose());
        assert!(!config.is_dry_run());
    }

    #[test]
    fn full_builder_threads_every_field() {
        let config = AppConfig::builder()
            .app_name("full-app")
            .log_level(LogLevel::Debug)
            .input_path("/input")
            .output_path("/output")
            .worker_threads(8)
            .verbose(true)
            .dry_run(true)
            .build();

        assert_eq!(config.log_level(), LogLevel::Debug);
        assert_eq!(config.input_path(), Some(&PathBuf::from("/input")));
        assert_eq!(config.worker_threads(), Some(8));
        assert!(config.is_verbose());
        assert!(config.is_dry_run());
    }

    #[test]
    #[should_panic(expected = "app_name is required")]
    fn build_panics_without_an_app_name() {
        AppConfig::builder().build();
    }

    #[test]
    fn try_build_reports_the_missing_app_name_instead_of_panicking() {
        let result = AppConfig::builder().try_build();
        assert_eq!(result.unwrap_err(), "app_name is required");
    }
}
