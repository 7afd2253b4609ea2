//! Report presenters
//!
//! Presenters for the two finished-stage events: a vulnerability report
//! for scan results and a violation list for policy validation.

use comfy_table::{Table, presets::UTF8_BORDERS_ONLY};
use scanview_bus::Presenter;
use std::fmt;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        })
    }
}

/// A vulnerable package found by the scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub id: String,
    pub severity: Severity,
    pub package: String,
    pub version: String,
    pub fixed_in: Option<String>,
}

/// Scan results for one image
#[derive(Debug, Clone)]
pub struct VulnerabilityReport {
    pub image: String,
    pub findings: Vec<Finding>,
}

impl VulnerabilityReport {
    fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }
}

impl Presenter for VulnerabilityReport {
    fn title(&self) -> String {
        format!("Scan results for {}", self.image)
    }

    fn present(&self, out: &mut dyn Write) -> anyhow::Result<()> {
        if self.findings.is_empty() {
            writeln!(out, "No vulnerabilities found")?;
            return Ok(());
        }

        let mut findings = self.findings.clone();
        findings.sort_by(|a, b| a.severity.cmp(&b.severity).then_with(|| a.id.cmp(&b.id)));

        let mut table = Table::new();
        table
            .load_preset(UTF8_BORDERS_ONLY)
            .set_header(vec!["ID", "SEVERITY", "PACKAGE", "VERSION", "FIXED IN"]);
        for f in &findings {
            table.add_row(vec![
                f.id.clone(),
                f.severity.to_string(),
                f.package.clone(),
                f.version.clone(),
                f.fixed_in.clone().unwrap_or_else(|| "-".to_string()),
            ]);
        }
        writeln!(out, "{table}")?;
        Ok(())
    }

    fn footer(&self) -> String {
        if self.findings.is_empty() {
            return String::new();
        }
        format!(
            "{} vulnerabilities ({} critical, {} high, {} medium, {} low)",
            self.findings.len(),
            self.count(Severity::Critical),
            self.count(Severity::High),
            self.count(Severity::Medium),
            self.count(Severity::Low),
        )
    }
}

/// Policy validation results with at least one violation
#[derive(Debug, Clone)]
pub struct ViolationReport {
    pub policy: String,
    pub violations: Vec<String>,
}

impl Presenter for ViolationReport {
    fn title(&self) -> String {
        format!("Policy {} violated", self.policy)
    }

    fn present(&self, out: &mut dyn Write) -> anyhow::Result<()> {
        for (i, violation) in self.violations.iter().enumerate() {
            writeln!(out, "{:>3}. {violation}", i + 1)?;
        }
        Ok(())
    }

    fn footer(&self) -> String {
        format!("{} violation(s)", self.violations.len())
    }
}
