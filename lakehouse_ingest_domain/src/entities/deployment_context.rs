use crate::value_objects::DeploymentMode;
use serde::{Deserialize, Serialize};

/// The customer-facing configuration a run is executed under, parsed from a
/// per-customer deployment descriptor (a markdown file with a small set of
/// recognized headers). Absent headers fall back to the defaults below
/// rather than failing the run - a missing descriptor is a degraded-mode
/// start, not a fatal one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentContext {
    pub company_name: String,
    pub industry: Option<String>,
    pub source_format: Option<String>,
    pub ingestion_instructions: Vec<String>,
    pub mode: DeploymentMode,
}

impl DeploymentContext {
    pub fn new(company_name: impl Into<String>, mode: DeploymentMode) -> Self {
        Self {
            company_name: company_name.into(),
            industry: None,
            source_format: None,
            ingestion_instructions: Vec::new(),
            mode,
        }
    }

    /// Parses a deployment descriptor of the form:
    ///
    /// ```text
    /// # Company Name
    /// Acme Corp
    ///
    /// # Industry
    /// Manufacturing
    ///
    /// # Source Format
    /// CSV exports from SAP
    ///
    /// # Ingestion Instructions
    /// - Treat any file under invoices/ as Finance category
    /// - Skip files named draft_*
    /// ```
    ///
    /// Unrecognized headers are ignored; recognized headers with no body
    /// are left at their default (`None` / empty), matching the original
    /// Python loader's tolerance of partial descriptors.
    pub fn parse_descriptor(markdown: &str, mode: DeploymentMode) -> Self {
        let mut company_name = String::new();
        let mut industry = None;
        let mut source_format = None;
        let mut instructions = Vec::new();

        let mut current_header: Option<&str> = None;
        for line in markdown.lines() {
            let trimmed = line.trim();
            if let Some(header) = trimmed.strip_prefix('#') {
                current_header = Some(header.trim());
                continue;
            }
            if trimmed.is_empty() {
                continue;
            }
            match current_header {
                Some("Company Name") => company_name.push_str(trimmed),
                Some("Industry") => industry = Some(trimmed.to_string()),
                Some("Source Format") => source_format = Some(trimmed.to_string()),
                Some("Ingestion Instructions") => {
                    let item = trimmed.trim_start_matches('-').trim();
                    if !item.is_empty() {
                        instructions.push(item.to_string());
                    }
                }
                _ => {}
            }
        }

        Self {
            company_name,
            industry,
            source_format,
            ingestion_instructions: instructions,
            mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_recognized_headers() {
        let descriptor = "# Company Name\nAcme Corp\n\n# Industry\nManufacturing\n\n# Ingestion Instructions\n- Treat invoices/ as Finance\n- Skip draft_*\n";
        let ctx = DeploymentContext::parse_descriptor(descriptor, DeploymentMode::Development);
        assert_eq!(ctx.company_name, "Acme Corp");
        assert_eq!(ctx.industry.as_deref(), Some("Manufacturing"));
        assert_eq!(ctx.ingestion_instructions.len(), 2);
    }

    #[test]
    fn missing_headers_fall_back_to_defaults() {
        let ctx = DeploymentContext::parse_descriptor("# Company Name\nWidgets Inc\n", DeploymentMode::Managed);
        assert_eq!(ctx.company_name, "Widgets Inc");
        assert!(ctx.industry.is_none());
        assert!(ctx.ingestion_instructions.is_empty());
    }
}
