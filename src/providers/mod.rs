mod jenkins;

pub use jenkins::{parse_base_url, CollectOptions, Collection, JenkinsProvider, ParameterProbe};
#[cfg(test)]
pub use jenkins::JobFailure;
