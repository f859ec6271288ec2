use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::info;
use serde::Serialize;

use crate::error::Result;
use crate::stats::AnalysisMode;

use super::report::{DerivedRecord, ParameterReport};

/// Writes the JSON artifact: an object keyed by parameter value, in report order.
pub fn export_json(report: &ParameterReport, output: &mut dyn Write) -> Result<()> {
    let records: IndexMap<&str, &DerivedRecord> = report
        .rows
        .iter()
        .map(|row| (row.value.as_str(), &row.stats))
        .collect();

    serde_json::to_writer_pretty(&mut *output, &records)?;
    writeln!(output)?;
    Ok(())
}

/// Writes the CSV artifact. The last column lists build numbers in
/// single-job mode and contributing jobs otherwise.
pub fn export_csv(report: &ParameterReport, output: &mut dyn Write) -> Result<()> {
    let last_column = match report.mode {
        AnalysisMode::SingleJob => "Build_Numbers",
        AnalysisMode::MultiJob => "Job_List",
    };
    writeln!(
        output,
        "Parameter_Value,Total_Builds,Successful_Builds,Failed_Builds,Unstable_Builds,\
         Aborted_Builds,Success_Rate,Failure_Rate,Avg_Duration_Minutes,Unique_Jobs,{last_column}"
    )?;

    for row in &report.rows {
        let stats = &row.stats;
        let record = &stats.record;

        let contributors = match report.mode {
            AnalysisMode::SingleJob => record
                .build_numbers
                .iter()
                .flatten()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            // BTreeSet iteration is already sorted.
            AnalysisMode::MultiJob => record
                .jobs
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join("; "),
        };

        writeln!(
            output,
            "{},{},{},{},{},{},{:.2}%,{:.2}%,{:.2},{},{}",
            csv_field(&row.value),
            record.total_builds,
            record.successful_builds,
            record.failed_builds,
            record.unstable_builds,
            record.aborted_builds,
            stats.success_rate * 100.0,
            stats.failure_rate * 100.0,
            stats.avg_duration_min,
            record.jobs.len(),
            csv_field(&contributors),
        )?;
    }

    Ok(())
}

fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Persists artifacts into one output directory, created on first write.
///
/// Every artifact is written with a single call so an interrupted run never
/// leaves a half-written file behind.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for `name`; path separators in job or parameter names become `-`.
    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(name.replace(['/', '\\'], "-"))
    }

    pub fn write(&self, name: &str, contents: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(name);
        fs::write(&path, contents)?;
        info!("Saved {}", path.display());
        Ok(path)
    }

    pub fn write_json(&self, name: &str, value: &impl Serialize) -> Result<PathBuf> {
        let mut body = serde_json::to_vec_pretty(value)?;
        body.push(b'\n');
        self.write(name, &body)
    }

    /// Writes the JSON and CSV statistics artifacts for `report`.
    pub fn write_report(&self, report: &ParameterReport) -> Result<Vec<PathBuf>> {
        let mut json = Vec::new();
        export_json(report, &mut json)?;
        let mut csv = Vec::new();
        export_csv(report, &mut csv)?;

        Ok(vec![
            self.write(&report.json_file_name(), &json)?,
            self.write(&report.csv_file_name(), &csv)?,
        ])
    }
}
