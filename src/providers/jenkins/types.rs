use serde::Deserialize;
use serde_json::{Map, Value};

/// A job entry from the server root listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobSummary {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// A single build from a job's `builds` array.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Build {
    /// Build number; missing numbers deserialize as 0.
    #[serde(default)]
    pub number: u64,
    /// Final result (`SUCCESS`, `FAILURE`, ...); `None` while running.
    #[serde(default)]
    pub result: Option<String>,
    /// Duration in milliseconds; 0 while running.
    #[serde(default)]
    pub duration: Option<i64>,
    /// Build actions. Jenkins emits `null` or `{}` for actions outside the tree.
    #[serde(default)]
    pub actions: Vec<Option<Action>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Action {
    #[serde(default)]
    pub parameters: Option<Vec<BuildParameter>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildParameter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Value,
}

/// Body of `<job>/api/json` with a `builds` tree projection.
#[derive(Debug, Default, Deserialize)]
pub struct BuildsResponse {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub builds: Option<Vec<Build>>,
}

/// Shape of a response to the server root listing request, decided once at the
/// boundary so callers match on it instead of probing keys.
#[derive(Debug, PartialEq, Eq)]
pub enum ServerResponse {
    JobListing(Vec<JobSummary>),
    /// The URL points at a job: the payload has `name` and `builds` but no `jobs`.
    SingleJob { name: String },
    Unrecognized { keys: Vec<String> },
}

impl ServerResponse {
    pub fn classify(value: Value) -> serde_json::Result<Self> {
        let Value::Object(mut map) = value else {
            return Ok(Self::Unrecognized { keys: Vec::new() });
        };

        if let Some(jobs) = map.remove("jobs") {
            return Ok(Self::JobListing(serde_json::from_value(jobs)?));
        }

        if map.contains_key("name") && map.contains_key("builds") {
            return Ok(Self::SingleJob {
                name: string_field(&map, "name"),
            });
        }

        Ok(Self::Unrecognized {
            keys: map.keys().cloned().collect(),
        })
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_job_listing() {
        let response = ServerResponse::classify(json!({
            "_class": "hudson.model.Hudson",
            "jobs": [
                {"name": "deploy-a", "url": "http://jenkins/job/deploy-a/"},
                {"name": "build-b"}
            ]
        }))
        .unwrap();

        let ServerResponse::JobListing(jobs) = response else {
            panic!("expected a job listing");
        };
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].url.as_deref(), Some("http://jenkins/job/deploy-a/"));
        assert_eq!(jobs[1].url, None);
    }

    #[test]
    fn test_classify_single_job_payload() {
        let response =
            ServerResponse::classify(json!({"name": "app", "builds": []})).unwrap();
        assert_eq!(
            response,
            ServerResponse::SingleJob {
                name: "app".to_string()
            }
        );
    }

    #[test]
    fn test_classify_unrecognized_reports_keys() {
        let response =
            ServerResponse::classify(json!({"_class": "x", "views": []})).unwrap();
        let ServerResponse::Unrecognized { mut keys } = response else {
            panic!("expected unrecognized");
        };
        keys.sort();
        assert_eq!(keys, vec!["_class", "views"]);

        assert_eq!(
            ServerResponse::classify(json!([1, 2])).unwrap(),
            ServerResponse::Unrecognized { keys: vec![] }
        );
    }

    #[test]
    fn test_build_tolerates_missing_and_null_fields() {
        let build: Build = serde_json::from_value(json!({
            "number": 7,
            "result": null,
            "actions": [null, {}, {"_class": "hudson.model.CauseAction"},
                        {"parameters": [{"name": "env", "value": "prod"}]}]
        }))
        .unwrap();

        assert_eq!(build.number, 7);
        assert_eq!(build.result, None);
        assert_eq!(build.duration, None);
        assert_eq!(build.actions.len(), 4);
        assert!(build.actions[0].is_none());

        let bare: Build = serde_json::from_value(json!({"number": 1})).unwrap();
        assert!(bare.actions.is_empty());
    }
}
