use serde_json::Value;

use super::types::{Build, BuildParameter};

/// How many of the most recent builds are inspected when suggesting
/// parameter names.
const PROBE_BUILDS: usize = 3;

fn parameters(build: &Build) -> impl Iterator<Item = &BuildParameter> {
    build
        .actions
        .iter()
        .flatten()
        .filter_map(|action| action.parameters.as_deref())
        .flatten()
}

/// Returns the value of the first parameter named `name` in `build`, in action
/// order, or `None` when the build does not carry it.
pub fn extract_parameter_value(build: &Build, name: &str) -> Option<String> {
    parameters(build)
        .find(|param| param.name.as_deref() == Some(name))
        .map(|param| value_to_string(&param.value))
}

/// Renders a parameter value as text. Strings are returned verbatim and a
/// missing value becomes the empty string.
fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parameter names seen in recent builds, used to hint at the right spelling
/// when nothing matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterProbe {
    /// Number of the most recent build inspected.
    pub latest_build: Option<u64>,
    /// Distinct names from the first recent build that has any parameters.
    pub names: Vec<String>,
}

pub fn probe_parameter_names(builds: &[Build]) -> ParameterProbe {
    let latest_build = builds.first().map(|b| b.number);

    let names = builds
        .iter()
        .take(PROBE_BUILDS)
        .map(|build| {
            let mut names: Vec<String> = Vec::new();
            for name in parameters(build).filter_map(|p| p.name.as_ref()) {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
            names
        })
        .find(|names| !names.is_empty())
        .unwrap_or_default();

    ParameterProbe {
        latest_build,
        names,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(value: serde_json::Value) -> Build {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_extract_parameter_value() {
        let b = build(json!({
            "actions": [{
                "parameters": [
                    {"name": "environment", "value": "production"},
                    {"name": "branch", "value": "main"}
                ]
            }]
        }));

        assert_eq!(
            extract_parameter_value(&b, "environment").as_deref(),
            Some("production")
        );
        assert_eq!(extract_parameter_value(&b, "branch").as_deref(), Some("main"));
        assert_eq!(extract_parameter_value(&b, "nonexistent"), None);
    }

    #[test]
    fn test_extract_is_case_sensitive() {
        let b = build(json!({
            "actions": [{"parameters": [{"name": "Environment", "value": "prod"}]}]
        }));
        assert_eq!(extract_parameter_value(&b, "environment"), None);
    }

    #[test]
    fn test_extract_no_actions() {
        assert_eq!(
            extract_parameter_value(&build(json!({"actions": []})), "environment"),
            None
        );
        assert_eq!(
            extract_parameter_value(&build(json!({"number": 3})), "environment"),
            None
        );
    }

    #[test]
    fn test_extract_no_parameters_in_actions() {
        let b = build(json!({"actions": [null, {}, {"someOtherData": "value"}]}));
        assert_eq!(extract_parameter_value(&b, "environment"), None);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let b = build(json!({
            "actions": [
                {"_class": "hudson.model.CauseAction"},
                {"parameters": [
                    {"name": "env", "value": "first"},
                    {"name": "env", "value": "second"}
                ]},
                {"parameters": [{"name": "env", "value": "third"}]}
            ]
        }));
        assert_eq!(extract_parameter_value(&b, "env").as_deref(), Some("first"));
    }

    #[test]
    fn test_empty_value_is_distinct_from_missing() {
        let b = build(json!({
            "actions": [{"parameters": [
                {"name": "empty", "value": ""},
                {"name": "null"}
            ]}]
        }));
        assert_eq!(extract_parameter_value(&b, "empty").as_deref(), Some(""));
        assert_eq!(extract_parameter_value(&b, "null").as_deref(), Some(""));
        assert_eq!(extract_parameter_value(&b, "absent"), None);
    }

    #[test]
    fn test_non_string_values_are_stringified() {
        let b = build(json!({
            "actions": [{"parameters": [
                {"name": "dry_run", "value": true},
                {"name": "replicas", "value": 3}
            ]}]
        }));
        assert_eq!(extract_parameter_value(&b, "dry_run").as_deref(), Some("true"));
        assert_eq!(extract_parameter_value(&b, "replicas").as_deref(), Some("3"));
    }

    #[test]
    fn test_probe_uses_first_build_with_parameters() {
        let builds = vec![
            build(json!({"number": 12, "actions": [{}]})),
            build(json!({"number": 11, "actions": [
                {"parameters": [{"name": "ENV"}, {"name": "BRANCH"}, {"name": "ENV"}]}
            ]})),
            build(json!({"number": 10, "actions": [
                {"parameters": [{"name": "OTHER"}]}
            ]})),
        ];

        let probe = probe_parameter_names(&builds);
        assert_eq!(probe.latest_build, Some(12));
        assert_eq!(probe.names, vec!["ENV", "BRANCH"]);
    }

    #[test]
    fn test_probe_only_inspects_recent_builds() {
        let builds = vec![
            build(json!({"number": 4})),
            build(json!({"number": 3})),
            build(json!({"number": 2})),
            build(json!({"number": 1, "actions": [{"parameters": [{"name": "late"}]}]})),
        ];

        let probe = probe_parameter_names(&builds);
        assert!(probe.names.is_empty());
        assert_eq!(probe.latest_build, Some(4));
    }
}
