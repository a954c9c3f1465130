//! Response formats of the Jenkins API.

use pipeline::{BuildStatus, JobError, QueueItemId};
use serde::Deserialize;
use serde_json::Value;

/// The fields of `lastBuild/api/json` the monitor needs. Jenkins sends many
/// more; they are ignored.
#[derive(Debug, Deserialize)]
struct LastBuildDocument {
    #[serde(default)]
    number: Option<u64>,
    /// `null` while the build is running.
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    building: Option<bool>,
}

/// Parses a status response body.
///
/// The body must be a JSON object. A missing `building` flag means the server
/// reports nothing running.
pub(crate) fn parse_last_build(body: &str) -> Result<BuildStatus, JobError> {
    let value: Value = serde_json::from_str(body).map_err(|e| JobError::Parse {
        message: e.to_string(),
    })?;
    if !value.is_object() {
        return Err(JobError::Parse {
            message: "expected a JSON object".to_owned(),
        });
    }
    let doc: LastBuildDocument = serde_json::from_value(value).map_err(|e| JobError::Parse {
        message: e.to_string(),
    })?;

    Ok(BuildStatus::from_parts(
        doc.number,
        doc.result.as_deref(),
        doc.building.unwrap_or(false),
    ))
}

/// Extracts the queue item id from a trigger response `Location` header
/// (`http://ci/queue/item/123/`).
pub(crate) fn queue_item_from_location(location: &str) -> Option<QueueItemId> {
    let mut segments = location.trim_end_matches('/').rsplit('/');
    let id = segments.next()?.parse().ok()?;
    match segments.next() {
        Some("item") => Some(QueueItemId::new(id)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pipeline::{BuildNumber, BuildResult};

    use super::*;

    #[test]
    fn parses_running_build_with_null_result() {
        let status =
            parse_last_build(r#"{"number": 12, "result": null, "building": true}"#).unwrap();
        assert_eq!(status.number, Some(BuildNumber::new(12)));
        assert_eq!(status.result, BuildResult::Pending);
        assert!(status.building);
    }

    #[test]
    fn ignores_unrelated_fields() {
        let body = r#"{
            "_class": "hudson.model.FreeStyleBuild",
            "number": 42,
            "result": "FAILURE",
            "building": false,
            "duration": 120000,
            "url": "http://localhost:9090/job/ShopSphere-Simple/42/"
        }"#;
        let status = parse_last_build(body).unwrap();
        assert_eq!(status.result, BuildResult::Failure);
        assert!(status.is_terminal());
    }

    #[test]
    fn missing_building_flag_reads_as_stopped() {
        let status = parse_last_build(r#"{"number": 3, "result": "SUCCESS"}"#).unwrap();
        assert!(!status.building);
        assert_eq!(status.result, BuildResult::Success);
    }

    #[test]
    fn rejects_non_json_and_non_objects() {
        assert!(matches!(
            parse_last_build("<html>Jenkins is starting</html>"),
            Err(JobError::Parse { .. })
        ));
        assert!(matches!(parse_last_build("[1, null, true]"), Err(JobError::Parse { .. })));
        assert!(matches!(parse_last_build(""), Err(JobError::Parse { .. })));
    }

    #[test]
    fn rejects_fields_of_the_wrong_type() {
        assert!(matches!(
            parse_last_build(r#"{"number": "forty-two", "building": false}"#),
            Err(JobError::Parse { .. })
        ));
    }

    #[test]
    fn queue_item_comes_from_location_header() {
        assert_eq!(
            queue_item_from_location("http://localhost:9090/queue/item/123/"),
            Some(QueueItemId::new(123))
        );
        assert_eq!(queue_item_from_location("http://ci/queue/item/7"), Some(QueueItemId::new(7)));
        assert_eq!(queue_item_from_location("http://ci/queue/invalid/"), None);
        assert_eq!(queue_item_from_location("http://ci/job/x/55/"), None);
    }
}
