mod client;
mod collector;
mod discovery;
mod parameters;
mod progress_bar;
mod provider;
mod single_job;
mod types;

pub use client::parse_base_url;
pub use parameters::ParameterProbe;
pub use provider::{CollectOptions, Collection, JenkinsProvider};
#[cfg(test)]
pub use provider::JobFailure;
