use serde::{Deserialize, Serialize};
use std::fmt;

/// Which environment the ingestion core is running in. Drives the Path
/// Resolver's directory layout: managed deployments share one base prefix
/// per kind with no per-customer subdirectory (the container boundary
/// already isolates tenants); self-hosted and development deployments
/// compose a per-customer subdirectory under the base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentMode {
    Managed,
    SelfHosted,
    Development,
}

impl DeploymentMode {
    /// Mirrors the original system's auto-detection exactly: an explicit
    /// `DEPLOYMENT_TYPE` env var wins, then `/.dockerenv` implies a
    /// managed container, then `/var/lib/0711` implies a self-hosted
    /// install, otherwise default to development.
    pub fn from_env() -> Self {
        if let Ok(value) = std::env::var("DEPLOYMENT_TYPE") {
            return Self::parse(&value).unwrap_or(Self::Development);
        }
        if std::path::Path::new("/.dockerenv").exists() {
            return Self::Managed;
        }
        if std::path::Path::new("/var/lib/0711").exists() {
            return Self::SelfHosted;
        }
        Self::Development
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "managed" => Some(Self::Managed),
            "self_hosted" | "self-hosted" => Some(Self::SelfHosted),
            "development" | "dev" => Some(Self::Development),
            _ => None,
        }
    }

    /// Managed mode resolves a bare base path with no per-customer
    /// subdirectory; the other two modes always nest under `customer_id`.
    pub fn uses_customer_subdir(&self) -> bool {
        !matches!(self, DeploymentMode::Managed)
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeploymentMode::Managed => "managed",
            DeploymentMode::SelfHosted => "self_hosted",
            DeploymentMode::Development => "development",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn managed_mode_has_no_customer_subdir() {
        assert!(!DeploymentMode::Managed.uses_customer_subdir());
        assert!(DeploymentMode::SelfHosted.uses_customer_subdir());
        assert!(DeploymentMode::Development.uses_customer_subdir());
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(DeploymentMode::parse("MANAGED"), Some(DeploymentMode::Managed));
        assert_eq!(DeploymentMode::parse("self-hosted"), Some(DeploymentMode::SelfHosted));
        assert_eq!(DeploymentMode::parse("bogus"), None);
    }
}
