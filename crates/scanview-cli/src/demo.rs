//! Simulated scan pipeline
//!
//! Publishes the event sequence a real fetch/catalog/scan pipeline would
//! produce, with each stage's progress advanced by its own task. Used by
//! `scanview demo` to exercise the display end to end.

use crate::report::{Finding, Severity, ViolationReport, VulnerabilityReport};
use scanview_bus::{ErrorEvent, Event, EventKind, Progress, PublishError, Publisher};
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct DemoOptions {
    /// Image reference shown on every stage line
    pub image: String,
    /// Number of layers to "pull"
    pub layers: u64,
    /// Time per unit of simulated work
    pub step: Duration,
    /// Fail the scan stage with this exit code
    pub fail_with: Option<i32>,
    /// Finish with a policy violation report instead of scan results
    pub violations: bool,
    /// Announce a newer release before starting
    pub new_version: Option<String>,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            image: "alpine:3.19".to_string(),
            layers: 4,
            step: Duration::from_millis(250),
            fail_with: None,
            violations: false,
            new_version: None,
        }
    }
}

/// Advance `progress` through `units` steps on a background task
fn run_stage(progress: Progress, units: u64, step: Duration, stage: &'static str) -> JoinHandle<()> {
    tokio::spawn(async move {
        progress.set_total(units);
        for i in 1..=units {
            progress.set_stage(format!("{stage} {i}/{units}"));
            tokio::time::sleep(step).await;
            progress.advance(1);
        }
        progress.set_stage("");
        progress.complete();
    })
}

async fn join(handle: JoinHandle<()>) {
    if let Err(e) = handle.await {
        tracing::warn!(error = %e, "demo stage task failed");
    }
}

/// Publish the full pipeline. Returns once the terminal event is sent.
pub async fn run_pipeline(publisher: Publisher, opts: DemoOptions) -> Result<(), PublishError> {
    if let Some(version) = &opts.new_version {
        let notice = format!("A newer version of scanview is available: {version}");
        publisher
            .publish(Event::new(EventKind::VersionAvailable(notice)))
            .await?;
    }

    let pull = Progress::new(&opts.image);
    publisher
        .publish(Event::new(EventKind::PullImage(pull.clone())))
        .await?;
    join(run_stage(pull, opts.layers, opts.step, "layer")).await;
    for layer in 0..opts.layers {
        publisher
            .publish(Event::new(EventKind::ReadLayer(format!("sha256:{layer:064x}"))))
            .await?;
    }

    let catalog = Progress::new(&opts.image);
    publisher
        .publish(Event::new(EventKind::CatalogerStarted(catalog.clone())))
        .await?;
    let cataloging = run_stage(catalog, 3, opts.step, "cataloger");
    // Published while the cataloger is still running; the display holds it
    // back until the spinner above has settled.
    publisher
        .publish(Event::new(EventKind::MessageDetected(format!(
            "Cataloged packages for {}",
            opts.image
        ))))
        .await?;
    join(cataloging).await;
    publisher
        .publish(Event::new(EventKind::CatalogerFinished))
        .await?;

    let scan = Progress::new(&opts.image);
    publisher
        .publish(Event::new(EventKind::ScanStarted(scan.clone())))
        .await?;

    if let Some(code) = opts.fail_with {
        tokio::time::sleep(opts.step).await;
        scan.fail("vulnerability database unavailable");
        return publisher
            .publish(Event::error(ErrorEvent::with_exit_code(
                code,
                format!("failed to scan {}: vulnerability database unavailable", opts.image),
            )))
            .await;
    }

    join(run_stage(scan, 2, opts.step, "matcher")).await;

    let kind = if opts.violations {
        EventKind::ValidateWithViolations(Box::new(ViolationReport {
            policy: "no-critical-vulnerabilities".to_string(),
            violations: vec![format!(
                "{} contains CVE-2024-5535 (CRITICAL) in openssl 3.1.4",
                opts.image
            )],
        }))
    } else {
        EventKind::ScanFinished(Box::new(sample_report(&opts.image)))
    };
    publisher.publish(Event::terminal(kind)).await
}

fn sample_report(image: &str) -> VulnerabilityReport {
    let finding = |id: &str, severity, package: &str, version: &str, fixed: Option<&str>| Finding {
        id: id.to_string(),
        severity,
        package: package.to_string(),
        version: version.to_string(),
        fixed_in: fixed.map(str::to_string),
    };
    VulnerabilityReport {
        image: image.to_string(),
        findings: vec![
            finding("CVE-2024-5535", Severity::Critical, "openssl", "3.1.4", Some("3.1.7")),
            finding("CVE-2023-42363", Severity::Medium, "busybox", "1.36.1", None),
            finding("CVE-2024-2511", Severity::Low, "openssl", "3.1.4", Some("3.1.5")),
        ],
    }
}
