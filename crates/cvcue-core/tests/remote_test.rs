#![allow(clippy::unwrap_used)]
// End-to-end engine runs against a mocked CV-CUE API.

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cvcue_core::{
    ApiKeyCredentials, AuthError, CommandExecutor, CoreError, CountSource, CueAuthenticator,
    CueClient, ListMode, ListRequest, ProjectionMode, QueryIntent, RenderableOutput, SessionStore,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn creds() -> ApiKeyCredentials {
    ApiKeyCredentials {
        key_id: "test-key-id".into(),
        key_value: SecretString::from("test-key-value".to_string()),
        client_id: "test-client".into(),
        timeout_secs: 300,
    }
}

async fn setup(
    dir: &tempfile::TempDir,
) -> (MockServer, CommandExecutor<CueAuthenticator, CueClient>) {
    let server = MockServer::start().await;
    let base = format!("{}/wifi/api", server.uri());
    let client = CueClient::with_client(&base, reqwest::Client::new()).unwrap();
    let executor = CommandExecutor::new(
        SessionStore::new(dir.path().join("session.json")),
        CueAuthenticator::new(client.clone(), creds()),
        client,
    );
    (server, executor)
}

async fn mount_login(server: &MockServer, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/wifi/api/session"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("Set-Cookie", "JSESSIONID=live-1; Path=/"),
        )
        .expect(expected)
        .mount(server)
        .await;
}

fn devices(range: std::ops::Range<u32>) -> Vec<serde_json::Value> {
    range
        .map(|i| {
            json!({
                "boxid": i,
                "name": format!("AP-{i}"),
                "macaddress": format!("AA:BB:CC:00:00:{i:02X}"),
                "model": "AP-555",
                "active": true,
            })
        })
        .collect()
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_all_walks_pages_with_session_cookie() {
    let dir = tempfile::tempdir().unwrap();
    let (server, executor) = setup(&dir).await;
    mount_login(&server, 1).await;

    for (start, slice) in [("0", 0..100), ("100", 100..200), ("200", 200..250)] {
        Mock::given(method("GET"))
            .and(path("/wifi/api/manageddevices/aps"))
            .and(query_param("startindex", start))
            .and(query_param("pagesize", "100"))
            .and(header("Cookie", "JSESSIONID=live-1"))
            .and(header("Version", "19"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "managedDevices": devices(slice),
                "totalCount": 250,
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let outcome = executor
        .list(&ListRequest {
            intent: QueryIntent {
                page_size: Some(100),
                ..QueryIntent::default()
            },
            mode: ListMode::All,
            projection: ProjectionMode::Count(CountSource::Local),
        })
        .await
        .unwrap();

    assert_eq!(outcome.output, RenderableOutput::Count(250));
    assert_eq!(outcome.pages, 3);
    assert_eq!(outcome.total_count, Some(250));
    assert!(dir.path().join("session.json").exists());
}

#[tokio::test]
async fn test_cached_session_skips_login() {
    let dir = tempfile::tempdir().unwrap();
    let (server, executor) = setup(&dir).await;
    mount_login(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/wifi/api/manageddevices/aps"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "managedDevices": devices(0..3),
        })))
        .expect(2)
        .mount(&server)
        .await;

    let request = ListRequest {
        intent: QueryIntent::default(),
        mode: ListMode::SinglePage,
        projection: ProjectionMode::Compact,
    };
    executor.list(&request).await.unwrap();
    let outcome = executor.list(&request).await.unwrap();

    let RenderableOutput::Compact(listing) = outcome.output else {
        panic!("expected compact output");
    };
    assert_eq!(listing.lines.len(), 3);
    assert!(!outcome.has_more);
}

#[tokio::test]
async fn test_rejected_credentials_surface_as_auth_error() {
    let dir = tempfile::tempdir().unwrap();
    let (server, executor) = setup(&dir).await;

    Mock::given(method("POST"))
        .and(path("/wifi/api/session"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wifi/api/manageddevices/aps"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = executor
        .list(&ListRequest {
            intent: QueryIntent::default(),
            mode: ListMode::All,
            projection: ProjectionMode::Raw,
        })
        .await
        .unwrap_err();

    assert!(
        matches!(err, CoreError::Auth(AuthError::Rejected { .. })),
        "got: {err:?}"
    );
    assert!(!dir.path().join("session.json").exists());
}

#[tokio::test]
async fn test_server_error_on_second_page_names_page() {
    let dir = tempfile::tempdir().unwrap();
    let (server, executor) = setup(&dir).await;
    mount_login(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/wifi/api/manageddevices/aps"))
        .and(query_param("startindex", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "managedDevices": devices(0..2),
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wifi/api/manageddevices/aps"))
        .and(query_param("startindex", "2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let err = executor
        .list(&ListRequest {
            intent: QueryIntent {
                page_size: Some(2),
                ..QueryIntent::default()
            },
            mode: ListMode::All,
            projection: ProjectionMode::Raw,
        })
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            CoreError::PageFetch {
                page: 2,
                start_index: 2,
                ..
            }
        ),
        "got: {err:?}"
    );
    assert_eq!(err.api_error().and_then(cvcue_api::Error::status), Some(500));
}
