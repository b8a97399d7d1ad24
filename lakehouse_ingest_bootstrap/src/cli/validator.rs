// /////////////////////////////////////////////////////////////////////////////
// Lakehouse Ingest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Secure Command-Line Argument Parsing
//!
//! Security-first argument validation: length limits, path-traversal and
//! shell-injection pattern detection, canonicalization, and a protected
//! system-directory denylist.

use crate::config::AppConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

const MAX_ARG_COUNT: usize = 100;
const MAX_ARG_LENGTH: usize = 1000;
const MAX_PATH_LENGTH: usize = 4096;

const DANGEROUS_PATTERNS: &[&str] = &[
    "..", "~", "$", "`", ";", "&", "|", ">", "<", "\n", "\r", "\0",
];

const PROTECTED_DIRS: &[&str] = &["/etc", "/bin", "/sbin", "/usr/bin", "/usr/sbin", "/boot", "/sys", "/proc", "/dev"];

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("too many arguments (max {MAX_ARG_COUNT})")]
    TooManyArguments,

    #[error("argument too long (max {MAX_ARG_LENGTH} characters): {0}")]
    ArgumentTooLong(String),

    #[error("dangerous pattern detected in argument: {pattern} in {arg}")]
    DangerousPattern { pattern: String, arg: String },

    #[error("path exceeds maximum length (max {MAX_PATH_LENGTH})")]
    PathTooLong,

    #[error("access to protected system directory denied: {0}")]
    ProtectedDirectory(String),

    #[error("path does not exist: {0}")]
    PathNotFound(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("missing required argument: {0}")]
    MissingArgument(String),

    #[error("invalid argument value for {arg}: {reason}")]
    InvalidValue { arg: String, reason: String },
}

/// Security-first argument parser.
pub struct SecureArgParser;

impl SecureArgParser {
    pub fn parse(args: &[String]) -> Result<AppConfig, ParseError> {
        if args.len() > MAX_ARG_COUNT {
            return Err(ParseError::TooManyArguments);
        }
        Ok(AppConfig::builder().app_name("lakehouse-ingest").build())
    }

    /// Validates a single argument for length and dangerous shell patterns.
    pub fn validate_argument(arg: &str) -> Result<(), ParseError> {
        if arg.len() > MAX_ARG_LENGTH {
            return Err(ParseError::ArgumentTooLong(arg.chars().take(50).collect::<String>() + "..."));
        }

        for pattern in DANGEROUS_PATTERNS {
            if arg.contains(pattern) {
                return Err(ParseError::DangerousPattern {
                    pattern: pattern.to_string(),
                    arg: arg.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Validates and canonicalizes a path that is expected to already exist.
    pub fn validate_path(path: &str) -> Result<PathBuf, ParseError> {
        Self::validate_argument(path).map_err(|e| match e {
            ParseError::ArgumentTooLong(_) => ParseError::InvalidPath(format!("path too long: {path}")),
            ParseError::DangerousPattern { pattern, .. } => {
                ParseError::InvalidPath(format!("path contains dangerous pattern '{pattern}': {path}"))
            }
            other => other,
        })?;

        let path_obj = Path::new(path);

        let canonical = path_obj.canonicalize().map_err(|e| {
            if !path_obj.exists() {
                ParseError::PathNotFound(path.to_string())
            } else {
                ParseError::InvalidPath(format!("{path}: {e}"))
            }
        })?;

        if canonical.to_string_lossy().len() > MAX_PATH_LENGTH {
            return Err(ParseError::PathTooLong);
        }

        for protected in PROTECTED_DIRS {
            if canonical.starts_with(protected) {
                return Err(ParseError::ProtectedDirectory(canonical.display().to_string()));
            }
        }

        Ok(canonical)
    }

    pub fn validate_optional_path(path: Option<&str>) -> Result<Option<PathBuf>, ParseError> {
        match path {
            Some(p) => Self::validate_path(p).map(Some),
            None => Ok(None),
        }
    }

    pub fn validate_number<T>(arg_name: &str, value: &str, min: Option<T>, max: Option<T>) -> Result<T, ParseError>
    where
        T: std::str::FromStr + PartialOrd + std::fmt::Display,
    {
        Self::validate_argument(value)?;

        let num = value.parse::<T>().map_err(|_| ParseError::InvalidValue {
            arg: arg_name.to_string(),
            reason: format!("not a valid number: {value}"),
        })?;

        if let Some(min_val) = min {
            if num < min_val {
                return Err(ParseError::InvalidValue {
                    arg: arg_name.to_string(),
                    reason: format!("value {value} is less than minimum {min_val}"),
                });
            }
        }

        if let Some(max_val) = max {
            if num > max_val {
                return Err(ParseError::InvalidValue {
                    arg: arg_name.to_string(),
                    reason: format!("value {value} is greater than maximum {max_val}"),
                });
            }
        }

        Ok(num)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod argument_validation {
        use super::*;

        #[test]
        fn accepts_safe_arguments() {
            assert!(SecureArgParser::validate_argument("safe-arg").is_ok());
            assert!(SecureArgParser::validate_argument("file.txt").is_ok());
            assert!(SecureArgParser::validate_argument("path/to/file").is_ok());
        }

        #[test]
        fn rejects_too_long_arguments() {
            let long_arg = "a".repeat(MAX_ARG_LENGTH + 1);
            assert!(matches!(SecureArgParser::validate_argument(&long_arg), Err(ParseError::ArgumentTooLong(_))));
        }

        #[test]
        fn detects_dangerous_patterns() {
            let dangerous = vec![
                "../etc/passwd",
                "~/.ssh/id_rsa",
                "$(whoami)",
                "`ls`",
                "file;rm -rf /",
                "file&background",
                "file|pipe",
                "file>output",
                "file<input",
                "file\nwith\nnewlines",
            ];

            for arg in dangerous {
                assert!(
                    matches!(SecureArgParser::validate_argument(arg), Err(ParseError::DangerousPattern { .. })),
                    "failed to detect dangerous pattern in: {arg}"
                );
            }
        }
    }

    mod number_validation {
        use super::*;

        #[test]
        fn validates_valid_numbers() {
            let result = SecureArgParser::validate_number::<u32>("threads", "8", Some(1), Some(16));
            assert_eq!(result.unwrap(), 8);
        }

        #[test]
        fn rejects_invalid_numbers() {
            let result = SecureArgParser::validate_number::<u32>("threads", "abc", None, None);
            assert!(matches!(result, Err(ParseError::InvalidValue { .. })));
        }

        #[test]
        fn enforces_range_constraints() {
            let result = SecureArgParser::validate_number::<u32>("threads", "100", Some(1), Some(16));
            assert!(matches!(result, Err(ParseError::InvalidValue { .. })));

            let result = SecureArgParser::validate_number::<u32>("threads", "0", Some(1), Some(16));
            assert!(matches!(result, Err(ParseError::InvalidValue { .. })));
        }
    }

    mod parsing {
        use super::*;

        #[test]
        fn parses_basic_arguments() {
            let args = vec!["program".to_string()];
            assert!(SecureArgParser::parse(&args).is_ok());
        }

        #[test]
        fn rejects_too_many_arguments() {
            let args = vec!["arg".to_string(); MAX_ARG_COUNT + 1];
            assert!(matches!(SecureArgParser::parse(&args), Err(ParseError::TooManyArguments)));
        }
    }
}
