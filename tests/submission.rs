use std::cell::RefCell;

use inventory_agent::hardware::InventoryRecord;
use inventory_agent::submit::{Method, DEVICES_PATH};
use inventory_agent::{HttpTransport, SubmissionClient, SubmitError, Transport};
use serde_json::{json, Value};

/// Replays canned statuses and records every request.
struct ScriptedTransport {
    statuses: RefCell<Vec<u16>>,
    requests: RefCell<Vec<(Method, String, Value)>>,
}

impl ScriptedTransport {
    fn new(statuses: &[u16]) -> Self {
        ScriptedTransport {
            statuses: RefCell::new(statuses.iter().rev().copied().collect()),
            requests: RefCell::new(Vec::new()),
        }
    }

    fn methods(&self) -> Vec<Method> {
        self.requests.borrow().iter().map(|(m, _, _)| *m).collect()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, method: Method, path: &str, body: &Value) -> Result<u16, SubmitError> {
        self.requests
            .borrow_mut()
            .push((method, path.to_string(), body.clone()));
        self.statuses
            .borrow_mut()
            .pop()
            .ok_or_else(|| SubmitError::Transport("connection refused".to_string()))
    }
}

fn record() -> InventoryRecord {
    InventoryRecord {
        hostname: Some("node01".to_string()),
        ..InventoryRecord::new()
    }
}

#[test]
fn existing_device_is_patched_once() {
    let client = SubmissionClient::new(ScriptedTransport::new(&[200]));

    client.submit("SPM-34524623454", &record()).unwrap();

    let requests = client.transport().requests.borrow();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, Method::Patch);
    assert_eq!(requests[0].1, "/api/devices/SPM-34524623454");
    assert_eq!(requests[0].2["hostname"], "node01");
    assert_eq!(requests[0].2["type"], "Server");
}

#[test]
fn not_found_creates_then_retries_once() {
    let client = SubmissionClient::new(ScriptedTransport::new(&[404, 201, 200]));

    client.submit("SPM-34524623454", &record()).unwrap();

    let transport = client.transport();
    assert_eq!(
        transport.methods(),
        vec![Method::Patch, Method::Post, Method::Patch]
    );
    let requests = transport.requests.borrow();
    assert_eq!(requests[1].1, DEVICES_PATH);
    assert_eq!(requests[1].2, json!({ "sku": "SPM-34524623454", "type": "Server" }));
}

#[test]
fn unprocessable_also_creates() {
    let client = SubmissionClient::new(ScriptedTransport::new(&[422, 201, 204]));

    client.submit("DEL-ABC123", &record()).unwrap();

    assert_eq!(client.transport().methods().len(), 3);
}

#[test]
fn second_failure_is_not_retried() {
    let client = SubmissionClient::new(ScriptedTransport::new(&[404, 201, 404, 200]));

    let err = client.submit("SPM-34524623454", &record()).unwrap_err();

    assert!(matches!(
        err,
        SubmitError::Rejected {
            method: "PATCH",
            status: 404,
            ..
        }
    ));
    assert_eq!(client.transport().methods().len(), 3);
}

#[test]
fn refused_creation_still_retries_the_update() {
    let client = SubmissionClient::new(ScriptedTransport::new(&[404, 422, 200]));

    client.submit("SPM-34524623454", &record()).unwrap();

    assert_eq!(
        client.transport().methods(),
        vec![Method::Patch, Method::Post, Method::Patch]
    );
}

#[test]
fn refused_creation_and_failed_retry_reports_the_patch() {
    let client = SubmissionClient::new(ScriptedTransport::new(&[404, 500, 404]));

    let err = client.submit("SPM-34524623454", &record()).unwrap_err();

    assert!(matches!(
        err,
        SubmitError::Rejected {
            method: "PATCH",
            status: 404,
            ..
        }
    ));
    assert_eq!(client.transport().methods().len(), 3);
}

#[test]
fn other_errors_are_surfaced_without_retry() {
    let client = SubmissionClient::new(ScriptedTransport::new(&[500]));

    let err = client.submit("SPM-34524623454", &record()).unwrap_err();

    assert!(matches!(err, SubmitError::Rejected { status: 500, .. }));
    assert_eq!(client.transport().methods(), vec![Method::Patch]);
}

#[test]
fn transport_errors_propagate() {
    let client = SubmissionClient::new(ScriptedTransport::new(&[]));

    let err = client.submit("SPM-34524623454", &record()).unwrap_err();

    assert!(matches!(err, SubmitError::Transport(_)));
}

#[test]
fn token_with_newline_is_a_configuration_error() {
    let err = HttpTransport::new(
        "http://127.0.0.1:9",
        "s3cret\n",
        std::time::Duration::from_secs(2),
    )
    .err()
    .unwrap();

    assert!(matches!(err, SubmitError::InvalidToken(_)));
}

#[tokio::test]
async fn http_exchange_against_api() {
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/api/devices/SPM-34524623454"))
        .and(header("authorization", "Token token=\"s3cret\""))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/devices"))
        .and(body_json(json!({ "sku": "SPM-34524623454", "type": "Server" })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/devices/SPM-34524623454"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let endpoint = mock_server.uri();
    let result = tokio::task::spawn_blocking(move || {
        let transport =
            HttpTransport::new(&endpoint, "s3cret", std::time::Duration::from_secs(5))?;
        SubmissionClient::new(transport).submit("SPM-34524623454", &record())
    })
    .await
    .unwrap();

    assert!(result.is_ok(), "{:?}", result);
}

#[tokio::test]
async fn unreachable_api_is_a_transport_error() {
    let result = tokio::task::spawn_blocking(|| {
        let transport = HttpTransport::new(
            "http://127.0.0.1:9",
            "s3cret",
            std::time::Duration::from_secs(2),
        )?;
        SubmissionClient::new(transport).submit("SPM-34524623454", &record())
    })
    .await
    .unwrap();

    assert!(matches!(result, Err(SubmitError::Transport(_))));
}
