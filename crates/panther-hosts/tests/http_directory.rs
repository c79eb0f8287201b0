//! `HttpHostDirectory` against a mocked host endpoint.

use std::time::Duration;

use assert_matches::assert_matches;
use panther_core::{Host, LoginCredential, Target};
use panther_hosts::{HostDirectory, HostError, HttpHostDirectory, delete_batch};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn directory(server: &MockServer) -> HttpHostDirectory {
    let endpoint = Url::parse(&format!("{}/api/v1/host", server.uri())).unwrap();
    HttpHostDirectory::new(endpoint, Duration::from_secs(5)).unwrap()
}

fn host(name: &str, addr: &str) -> Host {
    let mut h = Host::new(name);
    h.ssh_addr = Some(addr.into());
    h.ssh_cred = LoginCredential::with_password("root", "s3cret");
    h
}

#[tokio::test]
async fn fetch_all_uses_wildcard_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/host"))
        .and(query_param("search", "*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "metadata": { "name": "db-1" }, "ssh_addr": "10.0.0.2", "ssh_port": 22 },
            { "metadata": { "name": "web-1" }, "ssh_addr": "10.0.0.1", "ssh_port": 2222 },
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let hosts = directory(&server).fetch(&Target::All).await.unwrap();
    assert_eq!(hosts.len(), 2);
    assert_eq!(hosts[1].name(), "web-1");
    assert_eq!(hosts[1].ssh_port, Some(2222));
}

#[tokio::test]
async fn fetch_named_hosts_joins_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("search", "a,b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let hosts = directory(&server)
        .fetch(&Target::hosts(["a", "b"]))
        .await
        .unwrap();
    assert!(hosts.is_empty());
}

#[tokio::test]
async fn null_body_is_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let hosts = directory(&server).fetch(&Target::All).await.unwrap();
    assert!(hosts.is_empty());
}

#[tokio::test]
async fn create_posts_host_json() {
    let server = MockServer::start().await;
    let new_host = host("web-1", "10.0.0.1");
    Mock::given(method("POST"))
        .and(path("/api/v1/host"))
        .and(body_json(json!({
            "metadata": { "name": "web-1" },
            "ssh_addr": "10.0.0.1",
            "ssh_port": 22,
            "ssh_cred": { "user": "root", "pass": "czNjcmV0" },
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "metadata": { "name": "web-1", "guid": "0b1c" },
            "ssh_addr": "10.0.0.1",
            "ssh_port": 22,
            "ssh_cred": { "user": "root", "pass": "czNjcmV0" },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let stored = directory(&server).create(&new_host).await.unwrap();
    assert_eq!(stored.metadata.guid.as_deref(), Some("0b1c"));
    assert_eq!(stored.ssh_cred.password().unwrap().as_deref(), Some("s3cret"));
}

#[tokio::test]
async fn update_uses_put() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/host"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metadata": { "name": "web-1" },
            "comment": "patched",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let stored = directory(&server)
        .update(&host("web-1", "10.0.0.1"))
        .await
        .unwrap();
    assert_eq!(stored.comment.as_deref(), Some("patched"));
}

#[tokio::test]
async fn rejection_carries_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Invalid IP address: 10.0\n"))
        .mount(&server)
        .await;

    let err = directory(&server)
        .create(&host("web-1", "10.0"))
        .await
        .unwrap_err();
    assert_matches!(
        err,
        HostError::Status { status: 400, ref message } if message == "Invalid IP address: 10.0"
    );
}

#[tokio::test]
async fn invalid_json_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = directory(&server).fetch(&Target::All).await.unwrap_err();
    assert_matches!(err, HostError::Decode(_));
}

#[tokio::test]
async fn delete_sends_target() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/host"))
        .and(query_param("target", "web-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    directory(&server).delete("web-1").await.unwrap();
}

#[tokio::test]
async fn delete_without_name_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let err = directory(&server).delete("").await.unwrap_err();
    assert_matches!(err, HostError::MissingName);
}

#[tokio::test]
async fn batch_delete_stops_at_first_failure() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(query_param("target", "a"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(query_param("target", "b"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Database Failure\n"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(query_param("target", "c"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let err = delete_batch(&directory(&server), ["a", "b", "c"])
        .await
        .unwrap_err();
    assert_eq!(err.deleted, 1);
    assert_eq!(err.name, "b");
    assert_matches!(err.source, HostError::Status { status: 500, .. });
}
