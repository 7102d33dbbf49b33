//! Oracle runner: drives every exported fixture through its laws.
//!
//! Laws checked:
//! - `identity`: `return_X(v) == v` for each declared value;
//! - `print`: `print_X(v)` emits exactly the decimal text of `v`;
//! - `width`: the storage holds the sentinel and nothing wider than the
//!   declared integer type;
//! - `calc`: the opaque aggregate's accessor returns the sum of its fields,
//!   on every platform layout and on the native value.

use serde::Serialize;
use std::os::raw::c_int;

use crate::catalog::{EnumFixture, ENUM_FIXTURES};
use crate::ffi::calc_OpaqueType_PlatformSpecificSize;
use crate::ignored::ExclusionList;
use crate::opaque::{OpaqueTypePlatformSpecificSize, PlatformLayout};
use crate::platform::TargetPlatform;
use crate::sink::CaptureSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleLaw {
    Identity,
    Print,
    Width,
    Calc,
}

impl OracleLaw {
    pub fn as_str(&self) -> &'static str {
        match self {
            OracleLaw::Identity => "identity",
            OracleLaw::Print => "print",
            OracleLaw::Width => "width",
            OracleLaw::Calc => "calc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OracleCheck {
    pub law: OracleLaw,
    pub subject: String,
    pub input: String,
    pub expected: String,
    pub observed: String,
    pub passed: bool,
}

impl OracleCheck {
    fn new(
        law: OracleLaw,
        subject: impl Into<String>,
        input: impl Into<String>,
        expected: String,
        observed: String,
    ) -> Self {
        let passed = expected == observed;
        Self {
            law,
            subject: subject.into(),
            input: input.into(),
            expected,
            observed,
            passed,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OracleReport {
    pub platform: TargetPlatform,
    pub total: usize,
    pub failed: usize,
    pub checks: Vec<OracleCheck>,
}

impl OracleReport {
    fn from_checks(platform: TargetPlatform, checks: Vec<OracleCheck>) -> Self {
        let failed = checks.iter().filter(|check| !check.passed).count();
        Self {
            platform,
            total: checks.len(),
            failed,
            checks,
        }
    }

    pub fn passed(&self) -> bool {
        self.failed == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &OracleCheck> {
        self.checks.iter().filter(|check| !check.passed)
    }

    pub fn render_table(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:<9} {:<38} {:<22} {:<22} {}\n",
            "law", "subject", "expected", "observed", "result"
        ));
        for check in &self.checks {
            out.push_str(&format!(
                "{:<9} {:<38} {:<22} {:<22} {}\n",
                check.law.as_str(),
                check.subject,
                check.expected,
                check.observed,
                if check.passed { "ok" } else { "FAIL" }
            ));
        }
        out.push_str(&format!(
            "{} checks on {}, {} failed\n",
            self.total, self.platform, self.failed
        ));
        out
    }
}

/// Run every law. Excluded enums are still exported natively, so their
/// oracles are checked too unless `include_excluded` is false.
pub fn run_oracles(exclusions: &ExclusionList, include_excluded: bool) -> OracleReport {
    let mut checks = Vec::new();
    for fixture in ENUM_FIXTURES.iter() {
        if !include_excluded && exclusions.is_excluded(fixture.c_name) {
            continue;
        }
        checks.extend(enum_checks(fixture));
    }
    checks.extend(calc_checks());

    let report = OracleReport::from_checks(TargetPlatform::current(), checks);
    if report.passed() {
        log::info!("[Oracle] All {} checks passed", report.total);
    } else {
        for failure in report.failures() {
            log::error!(
                "[Oracle] {} {} failed for {}: expected {}, observed {}",
                failure.law.as_str(),
                failure.subject,
                failure.input,
                failure.expected,
                failure.observed
            );
        }
    }
    report
}

fn enum_checks(fixture: &EnumFixture) -> Vec<OracleCheck> {
    let export = fixture.export;
    let mut checks = Vec::new();

    for constant in &fixture.constants {
        let value = i128::from(constant.value);

        let observed = (export.identity)(value);
        checks.push(OracleCheck::new(
            OracleLaw::Identity,
            export.return_symbol,
            constant.name,
            value.to_string(),
            describe(observed),
        ));

        let sink = CaptureSink::new();
        let accepted = (export.print)(value, &sink);
        let lines = sink.take();
        let observed = if accepted {
            lines.join("\\n")
        } else {
            "<out of range>".to_string()
        };
        checks.push(OracleCheck::new(
            OracleLaw::Print,
            export.print_symbol,
            constant.name,
            value.to_string(),
            observed,
        ));
    }

    let max = fixture.integer_type.max_value();
    let sentinel = fixture
        .sentinel()
        .map(|constant| i128::from(constant.value))
        .unwrap_or_default();
    checks.push(OracleCheck::new(
        OracleLaw::Width,
        fixture.c_name,
        "sentinel",
        "fits".to_string(),
        fits(fixture.integer_type.holds(sentinel) && (export.identity)(sentinel).is_some()),
    ));
    checks.push(OracleCheck::new(
        OracleLaw::Width,
        fixture.c_name,
        format!("{} max", fixture.integer_type.name),
        describe(Some(max)),
        describe((export.identity)(max)),
    ));
    checks.push(OracleCheck::new(
        OracleLaw::Width,
        fixture.c_name,
        format!("{} max + 1", fixture.integer_type.name),
        describe(None),
        describe((export.identity)(max + 1)),
    ));

    checks
}

fn calc_checks() -> Vec<OracleCheck> {
    let mut checks = Vec::new();
    for platform in TargetPlatform::ALL {
        let fields: Vec<c_int> = match platform {
            TargetPlatform::Linux => vec![5],
            TargetPlatform::Macos => vec![3, 4],
            TargetPlatform::Ios => vec![1, 2, 3],
            TargetPlatform::Windows => vec![1, 2, 3, 4],
        };
        let expected: c_int = fields.iter().sum();
        let observed = PlatformLayout::from_fields(platform, &fields)
            .map(|layout| layout.calc().to_string())
            .unwrap_or_else(|err| err.to_string());
        checks.push(OracleCheck::new(
            OracleLaw::Calc,
            format!("{} ({platform})", OpaqueTypePlatformSpecificSize::C_NAME),
            format!("{fields:?}"),
            expected.to_string(),
            observed,
        ));
    }

    let current = TargetPlatform::current();
    let fields: Vec<c_int> = (1..=current.opaque_field_count())
        .map(|index| (index as c_int) * 10)
        .collect();
    let expected: c_int = fields.iter().sum();
    let observed = OpaqueTypePlatformSpecificSize::from_fields(&fields)
        .map(|value| calc_OpaqueType_PlatformSpecificSize(value).to_string())
        .unwrap_or_else(|err| err.to_string());
    checks.push(OracleCheck::new(
        OracleLaw::Calc,
        format!("{} (native)", crate::ffi::OPAQUE_CALC_SYMBOL),
        format!("{fields:?}"),
        expected.to_string(),
        observed,
    ));
    checks
}

fn describe(value: Option<i128>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "<rejected>".to_string(),
    }
}

fn fits(value: bool) -> String {
    let label = if value { "fits" } else { "truncated" };
    label.to_string()
}
