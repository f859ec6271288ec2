mod exports;
mod report;
mod styling;
mod summary;
mod tables;

pub use exports::ArtifactWriter;
pub use report::ParameterReport;
pub use styling::{brand, count, failure, label, success, value};
pub use summary::print_summary;

/// Prints the `jenkins-stats` banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        brand("📈 jenkins-stats"),
        label(env!("CARGO_PKG_VERSION")),
        label("Jenkins build statistics by parameter")
    );
}
