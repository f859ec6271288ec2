use std::fmt::Write;

use comfy_table::{Cell, Color as TableColor};

use crate::stats::AnalysisMode;

use super::report::{ParameterReport, ReportRow};
use super::styling::{count, failure, heading, label, success_rate, value};
use super::tables::{
    create_table, duration_cell, failure_rate_cell, header_row, success_rate_cell,
};

const MAX_TABLE_ROWS: usize = 20;
const MAX_LISTED_BUILDS: usize = 8;

/// Prints a human-readable summary of the report to stdout.
///
/// Shows an overview (server, parameter, distinct values, total builds,
/// contributing jobs), a color-coded table of the busiest parameter values
/// and, when some jobs could not be fetched, why.
pub fn print_summary(report: &ParameterReport) {
    println!("{}", render_summary(report));
}

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(output, "{} {}", emoji, heading(title));
}

fn contributors_cell(report: &ParameterReport, row: &ReportRow) -> Cell {
    let record = &row.stats.record;
    match report.mode {
        AnalysisMode::MultiJob => Cell::new(record.jobs.len()),
        AnalysisMode::SingleJob => {
            let numbers = record.build_numbers.as_deref().unwrap_or_default();
            let mut text = numbers
                .iter()
                .take(MAX_LISTED_BUILDS)
                .map(|n| format!("#{n}"))
                .collect::<Vec<_>>()
                .join(" ");
            if numbers.len() > MAX_LISTED_BUILDS {
                let _ = write!(text, " (+{})", numbers.len() - MAX_LISTED_BUILDS);
            }
            Cell::new(text)
        }
    }
}

#[allow(clippy::cast_precision_loss)]
pub fn render_summary(report: &ParameterReport) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "📊", "Overview");

    let successful: u64 = report
        .rows
        .iter()
        .map(|row| row.stats.record.successful_builds)
        .sum();
    let overall = if report.total_builds > 0 {
        successful as f64 / report.total_builds as f64
    } else {
        0.0
    };

    let scope = match report.mode {
        AnalysisMode::MultiJob => format!(
            "{}/{} jobs with matching builds",
            report.jobs_with_stats, report.jobs_total
        ),
        AnalysisMode::SingleJob => "single job".to_string(),
    };

    let _ = write!(
        output,
        "  {} {}\n  {} {}\n  {} {}\n  {} {}\n  {} {}\n  {} {}\n  {} {}\n  {} {}\n\n",
        label("Server:"),
        value(&report.server),
        label("Parameter:"),
        value(&report.parameter),
        label("Scope:"),
        count(scope),
        label("Parameter values:"),
        count(report.rows.len()),
        label("Total builds:"),
        count(report.total_builds),
        label("Unique jobs:"),
        count(report.unique_jobs),
        label("Overall success rate:"),
        success_rate(overall),
        label("Analysis date:"),
        label(report.collected_at.format("%Y-%m-%d %H:%M UTC"))
    );

    if report.is_empty() {
        let _ = writeln!(
            output,
            "{}",
            count(format!("No builds carry parameter '{}'.", report.parameter))
        );
        return output;
    }

    add_section_header(
        &mut output,
        "📋",
        &format!("Builds by {}", report.parameter),
    );

    let last_column = match report.mode {
        AnalysisMode::MultiJob => "Jobs",
        AnalysisMode::SingleJob => "Builds #",
    };

    let mut table = create_table();
    table.set_header(header_row(&[
        "Parameter Value",
        "Builds",
        "Success",
        "Failure",
        "Unstable",
        "Aborted",
        "Avg Duration",
        last_column,
    ]));

    for row in report.rows.iter().take(MAX_TABLE_ROWS) {
        let stats = &row.stats;
        table.add_row(vec![
            Cell::new(&row.value),
            Cell::new(stats.record.total_builds),
            success_rate_cell(stats.success_rate),
            failure_rate_cell(stats.failure_rate),
            Cell::new(stats.record.unstable_builds),
            Cell::new(stats.record.aborted_builds),
            duration_cell(stats.avg_duration_min),
            contributors_cell(report, row),
        ]);
    }

    if report.rows.len() > MAX_TABLE_ROWS {
        let mut more = vec![Cell::new(format!(
            "... and {} more",
            report.rows.len() - MAX_TABLE_ROWS
        ))
        .fg(TableColor::DarkGrey)];
        more.extend(vec![Cell::new(""); 7]);
        table.add_row(more);
    }

    let _ = writeln!(output, "{table}");

    if !report.failed_jobs.is_empty() {
        let _ = writeln!(output);
        add_section_header(&mut output, "⚠️", "Failed Jobs");
        for failed in &report.failed_jobs {
            let _ = writeln!(
                output,
                "  {} {} {}",
                failure("•"),
                failed.job,
                label(&failed.reason)
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::report::tests::collection;
    use crate::providers::JobFailure;
    use crate::stats::BuildOutcome;

    #[test]
    fn test_render_summary_overview_and_table() {
        let report = ParameterReport::from_collection(
            "http://jenkins.example.com",
            "environment",
            collection(
                AnalysisMode::MultiJob,
                &[
                    ("prod", "app", 3, BuildOutcome::Success, 1000),
                    ("prod", "api", 2, BuildOutcome::Failure, 2000),
                    ("staging", "app", 1, BuildOutcome::Success, 500),
                ],
            ),
        );

        let output = render_summary(&report);

        assert!(output.contains("Overview"));
        assert!(output.contains("http://jenkins.example.com"));
        assert!(output.contains("Parameter values:"));
        assert!(output.contains("Total builds:"));
        assert!(output.contains("Unique jobs:"));
        assert!(output.contains("Builds by environment"));
        assert!(output.contains("prod"));
        assert!(output.contains("staging"));
        assert!(output.contains("Jobs"));
        assert!(!output.contains("Failed Jobs"));
    }

    #[test]
    fn test_render_summary_single_job_lists_build_numbers() {
        let report = ParameterReport::from_collection(
            "http://jenkins.example.com/job/app",
            "environment",
            collection(
                AnalysisMode::SingleJob,
                &[
                    ("prod", "app", 12, BuildOutcome::Success, 1000),
                    ("prod", "app", 11, BuildOutcome::Aborted, 0),
                ],
            ),
        );

        let output = render_summary(&report);

        assert!(output.contains("single job"));
        assert!(output.contains("Builds #"));
        assert!(output.contains("#12 #11"));
    }

    #[test]
    fn test_render_summary_truncates_long_tables() {
        let entries: Vec<(String, u64)> = (0..25).map(|i| (format!("value-{i}"), i)).collect();
        let refs: Vec<(&str, &str, u64, BuildOutcome, i64)> = entries
            .iter()
            .map(|(value, n)| (value.as_str(), "app", *n, BuildOutcome::Success, 100))
            .collect();
        let report = ParameterReport::from_collection(
            "http://jenkins",
            "environment",
            collection(AnalysisMode::MultiJob, &refs),
        );

        let output = render_summary(&report);

        assert!(output.contains("value-0"));
        assert!(!output.contains("value-24"));
        assert!(output.contains("... and 5 more"));
    }

    #[test]
    fn test_render_summary_lists_failed_jobs() {
        let mut collection = collection(
            AnalysisMode::MultiJob,
            &[("prod", "app", 1, BuildOutcome::Success, 100)],
        );
        collection.failures.push(JobFailure {
            job: "flaky-job".to_string(),
            error: crate::error::JenkinsStatsError::Api {
                url: "http://jenkins/job/flaky-job/api/json".to_string(),
                status: 502,
            },
        });
        let report = ParameterReport::from_collection("http://jenkins", "environment", collection);

        let output = render_summary(&report);

        assert!(output.contains("Failed Jobs"));
        assert!(output.contains("flaky-job"));
        assert!(output.contains("status 502"));
    }

    #[test]
    fn test_render_summary_empty_report() {
        let report = ParameterReport::from_collection(
            "http://jenkins",
            "environment",
            collection(AnalysisMode::MultiJob, &[]),
        );

        let output = render_summary(&report);

        assert!(output.contains("No builds carry parameter 'environment'"));
        assert!(!output.contains("Builds by"));
    }
}
