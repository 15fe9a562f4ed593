use std::path::PathBuf;

use serde_json::Value;
use substrate_tasks::error::{exit_codes, Error, JsonError};

#[test]
fn exit_code_user_error() {
    let err = Error::InvalidArgument("bad input".to_string());
    assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    assert_eq!(Error::NoSource.exit_code(), exit_codes::USER_ERROR);
    assert_eq!(
        Error::TaskNotFound("7".to_string()).exit_code(),
        exit_codes::USER_ERROR
    );
}

#[test]
fn exit_code_operation_failed() {
    let err = Error::OperationFailed("boom".to_string());
    assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILED);
    let err = Error::SnapshotUnreadable(PathBuf::from("tasks.json"));
    assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn details_include_http_status_fields() {
    let err = Error::HttpStatus {
        status: 503,
        url: "http://localhost/api/v1/tasks".to_string(),
        body: "unavailable".to_string(),
    };
    assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILED);
    let details = err.details().expect("details");
    assert_eq!(details["status"], Value::from(503));
    assert_eq!(
        details["url"],
        Value::String("http://localhost/api/v1/tasks".to_string())
    );
    assert_eq!(details["body"], Value::String("unavailable".to_string()));
}

#[test]
fn json_error_includes_details() {
    let err = Error::TaskNotFound("42".to_string());
    let json = JsonError::from(&err);
    assert_eq!(json.code, exit_codes::USER_ERROR);
    assert!(json.error.contains("42"));
    let details = json.details.expect("details");
    assert_eq!(details["id"], Value::String("42".to_string()));
}

#[test]
fn json_error_omits_missing_details() {
    let json = JsonError::from(&Error::NoSource);
    let value = serde_json::to_value(&json).expect("serialize");
    assert!(value.get("details").is_none());
}
