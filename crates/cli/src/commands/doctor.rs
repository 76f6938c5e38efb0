use catalog_core::config::{AppConfig, LoadOptions};
use catalog_core::ProductValidator;
use catalog_db::verify_seed_products;
use serde::Serialize;

use crate::commands::{escape_json, CommandResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    if json_output {
        let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
        return CommandResult { exit_code, output };
    }

    CommandResult { exit_code, output: render_human(&report) }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => checks.push(DoctorCheck {
            name: "config_validation",
            status: CheckStatus::Pass,
            details: format!("configuration loaded; listening on {}", config.listen_address()),
        }),
        Err(error) => checks.push(DoctorCheck {
            name: "config_validation",
            status: CheckStatus::Fail,
            details: error.to_string(),
        }),
    }

    match ProductValidator::new() {
        Ok(validator) => {
            checks.push(DoctorCheck {
                name: "sku_validator",
                status: CheckStatus::Pass,
                details: format!("sku pattern `{}` compiled", catalog_core::SKU_PATTERN),
            });
            checks.push(check_seed_products(&validator));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "sku_validator",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "seed_products",
                status: CheckStatus::Skipped,
                details: "skipped because the sku validator did not build".to_string(),
            });
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_seed_products(validator: &ProductValidator) -> DoctorCheck {
    let verification = verify_seed_products(validator);
    if verification.passed() {
        return DoctorCheck {
            name: "seed_products",
            status: CheckStatus::Pass,
            details: format!("{} seed products pass validation", verification.checked),
        };
    }

    let details = verification
        .failures
        .iter()
        .map(|(id, error)| format!("{id}: {error}"))
        .collect::<Vec<_>>()
        .join("; ");
    DoctorCheck { name: "seed_products", status: CheckStatus::Fail, details }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}
