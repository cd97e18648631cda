//! Diagnostic checks for a raw directory.
//!
//! [`check_raw_file`] walks through everything [`WatersRawFile`](super::WatersRawFile)
//! needs to open a file and records the outcome of each [`CheckStep`] instead of stopping
//! at the first error. Steps that depend on a failed one are reported as skipped.

use std::fmt::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::raw_file::validate_raw_path;
use super::sdk::{MassLynxReader, MassLynxSdk};
use super::WatersError;
use crate::helpers::IonTraceMode;
use crate::license::{LicenseResolver, LicenseSource};

/// What a raw directory is checked for, in the order the checks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStep {
    /// A license key can be resolved
    License,
    /// The path is a Waters raw directory
    RawPath,
    /// The MassLynx SDK library is loaded
    Sdk,
    /// The SDK opens the directory with the resolved key
    LicenseAccepted,
    /// MS functions and their ion modes
    Functions,
    /// Analog detector channels
    AnalogChannels,
}

impl CheckStep {
    /// Every step in run order
    pub const ALL: [CheckStep; 6] = [
        CheckStep::License,
        CheckStep::RawPath,
        CheckStep::Sdk,
        CheckStep::LicenseAccepted,
        CheckStep::Functions,
        CheckStep::AnalogChannels,
    ];

    /// Human readable name
    pub fn label(self) -> &'static str {
        match self {
            CheckStep::License => "license key",
            CheckStep::RawPath => "raw directory",
            CheckStep::Sdk => "MassLynx SDK",
            CheckStep::LicenseAccepted => "license accepted",
            CheckStep::Functions => "MS functions",
            CheckStep::AnalogChannels => "analog channels",
        }
    }
}

/// Outcome of one step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum CheckStatus {
    /// The step succeeded
    Passed,
    /// The step succeeded but found something worth knowing
    Warning(String),
    /// The step failed
    Failed(String),
    /// The step was not run because an earlier one failed
    Skipped,
}

/// A step together with its outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepResult {
    /// The step
    pub step: CheckStep,
    /// Its outcome
    #[serde(flatten)]
    pub status: CheckStatus,
}

/// Number of steps per outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    /// Steps that passed
    pub passed: usize,
    /// Steps that passed with a warning
    pub warnings: usize,
    /// Steps that failed
    pub failed: usize,
    /// Steps not run
    pub skipped: usize,
}

/// Outcome of [`check_raw_file`] for one raw directory.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    /// The raw directory that was checked
    pub path: PathBuf,
    /// One entry per [`CheckStep`], in run order
    pub steps: Vec<StepResult>,
    /// Where the license key came from, once resolved
    pub license_source: Option<LicenseSource>,
    /// Ion mode of each MS function, indexed by function number
    pub ion_modes: Vec<IonTraceMode>,
    /// Number of analog channels, once the SDK reported it
    pub analog_channels: Option<usize>,
}

impl CheckReport {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            steps: Vec::with_capacity(CheckStep::ALL.len()),
            license_source: None,
            ion_modes: Vec::new(),
            analog_channels: None,
        }
    }

    fn record(&mut self, step: CheckStep, status: CheckStatus) {
        self.steps.push(StepResult { step, status });
    }

    fn skip_remaining(mut self) -> Self {
        for step in CheckStep::ALL {
            if self.status(step).is_none() {
                self.record(step, CheckStatus::Skipped);
            }
        }
        self
    }

    /// Outcome of `step`
    pub fn status(&self, step: CheckStep) -> Option<&CheckStatus> {
        self.steps.iter().find(|r| r.step == step).map(|r| &r.status)
    }

    /// Count the steps by outcome
    pub fn tally(&self) -> Tally {
        let mut tally = Tally::default();
        for result in &self.steps {
            match result.status {
                CheckStatus::Passed => tally.passed += 1,
                CheckStatus::Warning(_) => tally.warnings += 1,
                CheckStatus::Failed(_) => tally.failed += 1,
                CheckStatus::Skipped => tally.skipped += 1,
            }
        }
        tally
    }

    /// Whether any step failed; the directory cannot be opened
    pub fn has_failures(&self) -> bool {
        self.tally().failed > 0
    }

    /// Whether any step produced a warning
    pub fn has_warnings(&self) -> bool {
        self.tally().warnings > 0
    }

    /// What a passed step found, from the structured fields of the report
    fn finding(&self, step: CheckStep) -> String {
        match step {
            CheckStep::License => self
                .license_source
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            CheckStep::Functions => {
                let modes: Vec<String> = self.ion_modes.iter().map(ToString::to_string).collect();
                format!("{} ({})", modes.len(), modes.join(", "))
            }
            CheckStep::AnalogChannels => self
                .analog_channels
                .map(|n| n.to_string())
                .unwrap_or_default(),
            CheckStep::RawPath | CheckStep::Sdk | CheckStep::LicenseAccepted => String::new(),
        }
    }

    fn write_report(&self, out: &mut dyn Write, styler: &dyn Styler) -> fmt::Result {
        writeln!(out, "{}", styler.paint(&self.path.display().to_string(), Tone::Title))?;

        for result in &self.steps {
            let (tag, tone, detail) = match &result.status {
                CheckStatus::Passed => ("pass", Tone::Pass, self.finding(result.step)),
                CheckStatus::Warning(msg) => ("warn", Tone::Warn, msg.clone()),
                CheckStatus::Failed(msg) => ("FAIL", Tone::Fail, msg.clone()),
                CheckStatus::Skipped => ("skip", Tone::Muted, String::new()),
            };
            let line = format!("{:<17} {}", result.step.label(), detail);
            writeln!(out, "  {}  {}", styler.paint(tag, tone), line.trim_end())?;
        }

        let tally = self.tally();
        let (verdict, tone) = if tally.failed > 0 {
            ("cannot be opened", Tone::Fail)
        } else if tally.warnings > 0 {
            ("can be opened, with warnings", Tone::Warn)
        } else {
            ("can be opened", Tone::Pass)
        };
        writeln!(
            out,
            "{} ({} passed, {} warnings, {} failed, {} skipped)",
            styler.paint(verdict, tone),
            tally.passed,
            tally.warnings,
            tally.failed,
            tally.skipped
        )
    }

    /// Render the report with `styler`
    pub fn render(&self, styler: &dyn Styler) -> String {
        let mut out = String::new();
        // Writing into a String does not fail
        let _ = self.write_report(&mut out, styler);
        out
    }

    /// Render with terminal colors (plain text without the `colorized_output` feature)
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            self.render(&Colored)
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            self.render(&Plain)
        }
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_report(f, &Plain)
    }
}

/// Role of a piece of report text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// The report heading
    Title,
    /// A passed step or a usable verdict
    Pass,
    /// A warning
    Warn,
    /// A failure
    Fail,
    /// A skipped step
    Muted,
}

/// Decorates report text according to its [`Tone`].
pub trait Styler {
    /// Decorate `text`
    fn paint(&self, text: &str, tone: Tone) -> String;
}

/// No decoration
pub struct Plain;

impl Styler for Plain {
    fn paint(&self, text: &str, _tone: Tone) -> String {
        text.to_string()
    }
}

/// ANSI colors through `console`; colors are dropped when the terminal does not support them
#[cfg(feature = "colorized_output")]
pub struct Colored;

#[cfg(feature = "colorized_output")]
impl Styler for Colored {
    fn paint(&self, text: &str, tone: Tone) -> String {
        let styled = console::style(text);
        match tone {
            Tone::Title => styled.bold().cyan(),
            Tone::Pass => styled.green(),
            Tone::Warn => styled.yellow().bold(),
            Tone::Fail => styled.red().bold(),
            Tone::Muted => styled.dim(),
        }
        .to_string()
    }
}

/// Check a raw directory against `sdk`.
///
/// `sdk` is `Err` with a reason when no SDK could be loaded; the license and path
/// checks still run. `license_dir` replaces the working directory as the location of
/// `license.key`.
pub fn check_raw_file(
    sdk: Result<&dyn MassLynxSdk, String>,
    path: &Path,
    license_key: Option<&str>,
    license_dir: Option<&Path>,
) -> CheckReport {
    let mut report = CheckReport::new(path);

    let resolver = match license_dir {
        Some(dir) => LicenseResolver::in_dir(dir),
        None => LicenseResolver::from_current_dir(),
    };
    let license = match resolver.resolve(license_key) {
        Ok(license) => {
            report.record(CheckStep::License, CheckStatus::Passed);
            report.license_source = Some(license.source.clone());
            Some(license)
        }
        Err(e) => {
            report.record(CheckStep::License, CheckStatus::Failed(e.to_string()));
            None
        }
    };

    match validate_raw_path(path) {
        Ok(()) => report.record(CheckStep::RawPath, CheckStatus::Passed),
        Err(e) => report.record(CheckStep::RawPath, CheckStatus::Failed(e.to_string())),
    }

    let sdk = match sdk {
        Ok(sdk) => {
            report.record(CheckStep::Sdk, CheckStatus::Passed);
            sdk
        }
        Err(reason) => {
            report.record(CheckStep::Sdk, CheckStatus::Failed(reason));
            return report.skip_remaining();
        }
    };
    let Some(license) = license.filter(|_| !report.has_failures()) else {
        return report.skip_remaining();
    };

    let reader = match sdk.open(path, &license.key) {
        Ok(reader) => {
            report.record(CheckStep::LicenseAccepted, CheckStatus::Passed);
            reader
        }
        Err(e) => {
            let error = WatersError::from(e);
            report.record(CheckStep::LicenseAccepted, CheckStatus::Failed(error.to_string()));
            return report.skip_remaining();
        }
    };

    let status = match ion_modes(reader.as_ref()) {
        Ok(modes) if modes.is_empty() => CheckStatus::Warning("no MS functions recorded".to_string()),
        Ok(modes) => {
            report.ion_modes = modes;
            CheckStatus::Passed
        }
        Err(e) => CheckStatus::Failed(WatersError::from(e).to_string()),
    };
    report.record(CheckStep::Functions, status);

    let status = match reader.analog_channel_count() {
        Ok(count) => {
            report.analog_channels = Some(count);
            if count == 0 {
                CheckStatus::Warning("no analog channels recorded".to_string())
            } else {
                CheckStatus::Passed
            }
        }
        Err(e) => CheckStatus::Failed(WatersError::from(e).to_string()),
    };
    report.record(CheckStep::AnalogChannels, status);

    report
}

fn ion_modes(reader: &dyn MassLynxReader) -> Result<Vec<IonTraceMode>, super::SdkError> {
    (0..reader.function_count()?)
        .map(|function| {
            reader
                .function_ion_mode(function)
                .map(|mode| IonTraceMode::from(mode.as_str()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_with(statuses: Vec<CheckStatus>) -> CheckReport {
        let mut report = CheckReport::new(Path::new("sample.raw"));
        for (step, status) in CheckStep::ALL.into_iter().zip(statuses) {
            report.record(step, status);
        }
        report
    }

    #[test]
    fn test_tally_and_verdict() {
        let mut report = report_with(vec![CheckStatus::Passed, CheckStatus::Passed]);
        report.license_source = Some(LicenseSource::Explicit);
        report.record(
            CheckStep::AnalogChannels,
            CheckStatus::Warning("no analog channels recorded".to_string()),
        );
        assert!(!report.has_failures());
        assert!(report.has_warnings());
        assert_eq!(report.tally().passed, 2);

        let text = report.to_string();
        assert!(text.starts_with("sample.raw\n"));
        assert!(text.contains("  pass  license key       explicit argument\n"));
        assert!(text.contains("  pass  raw directory\n"));
        assert!(text.contains("can be opened, with warnings (2 passed, 1 warnings, 0 failed, 0 skipped)"));
    }

    #[test]
    fn test_plain_render_matches_display() {
        let report = report_with(vec![CheckStatus::Failed("missing".to_string())]).skip_remaining();
        assert_eq!(report.render(&Plain), report.to_string());
        assert!(report.to_string().contains("  FAIL  license key       missing\n"));
        assert!(report.to_string().contains("  skip  MS functions\n"));
    }

    #[test]
    fn test_functions_finding_uses_ion_modes() {
        let mut report = CheckReport::new(Path::new("sample.raw"));
        report.ion_modes = vec![IonTraceMode::EsPositive, IonTraceMode::EsNegative];
        assert_eq!(report.finding(CheckStep::Functions), "2 (ES+, ES-)");
    }

    #[test]
    fn test_report_json() {
        let report = report_with(vec![CheckStatus::Failed("missing".to_string())]).skip_remaining();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["steps"][0]["step"], "license");
        assert_eq!(json["steps"][0]["status"], "failed");
        assert_eq!(json["steps"][0]["message"], "missing");
        assert_eq!(json["steps"][5]["step"], "analog_channels");
        assert_eq!(json["steps"][5]["status"], "skipped");
    }

    #[test]
    fn test_checks_without_sdk() {
        let dir = tempfile::TempDir::new().unwrap();
        let report = check_raw_file(
            Err("not installed".to_string()),
            &dir.path().join("missing.raw"),
            Some("XXXXXX"),
            Some(dir.path()),
        );
        let steps: Vec<CheckStep> = report.steps.iter().map(|r| r.step).collect();
        assert_eq!(steps, CheckStep::ALL.to_vec());
        assert_eq!(report.license_source, Some(LicenseSource::Explicit));
        assert_eq!(report.status(CheckStep::License), Some(&CheckStatus::Passed));
        assert!(matches!(report.status(CheckStep::RawPath), Some(CheckStatus::Failed(_))));
        assert_eq!(
            report.status(CheckStep::Sdk),
            Some(&CheckStatus::Failed("not installed".to_string()))
        );
        assert_eq!(report.tally(), Tally { passed: 1, warnings: 0, failed: 2, skipped: 3 });
    }
}
