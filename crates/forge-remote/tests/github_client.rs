//! HTTP-level tests for GitHubClient against a wiremock server.

use forge_remote::{
    FileWrite, GitHubClient, GitHubConfig, HostingService, NewPullRequest, RemoteError,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GitHubClient {
    let config = GitHubConfig::new("lab", "test-token").with_api_url(&server.uri());
    GitHubClient::new(config).expect("client")
}

#[tokio::test]
async fn test_get_repository_sends_token_and_parses_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/lab/demo"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "demo",
            "full_name": "lab/demo",
            "html_url": "https://github.com/lab/demo",
            "default_branch": "main",
            "private": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let repo = client_for(&server)
        .get_repository("demo")
        .await
        .expect("request")
        .expect("repository present");
    assert_eq!(repo.full_name, "lab/demo");
    assert_eq!(repo.default_branch.as_deref(), Some("main"));
}

#[tokio::test]
async fn test_missing_repository_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/lab/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(&server)
        .await;

    let repo = client_for(&server).get_repository("ghost").await.unwrap();
    assert!(repo.is_none());
}

#[tokio::test]
async fn test_get_branch_head_reads_object_sha() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/lab/demo/git/ref/heads/main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ref": "refs/heads/main",
            "object": { "sha": "abc123", "type": "commit" }
        })))
        .mount(&server)
        .await;

    let head = client_for(&server)
        .get_branch_head("demo", "main")
        .await
        .unwrap();
    assert_eq!(head.as_deref(), Some("abc123"));
}

#[tokio::test]
async fn test_create_existing_branch_maps_422_to_already_exists() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/lab/demo/git/refs"))
        .and(body_partial_json(json!({"ref": "refs/heads/develop", "sha": "abc123"})))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"message": "Reference already exists"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .create_branch("demo", "develop", "abc123")
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::AlreadyExists(_)));
}

#[tokio::test]
async fn test_get_file_passes_branch_as_ref() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/lab/demo/contents/.github/workflows/ci.yml"))
        .and(query_param("ref", "develop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "path": ".github/workflows/ci.yml",
            "sha": "blob-1",
            "type": "file"
        })))
        .mount(&server)
        .await;

    let meta = client_for(&server)
        .get_file("demo", ".github/workflows/ci.yml", "develop")
        .await
        .unwrap()
        .expect("file present");
    assert_eq!(meta.sha, "blob-1");
}

#[tokio::test]
async fn test_put_file_encodes_content_and_carries_sha() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/repos/lab/demo/contents/README.md"))
        .and(body_partial_json(json!({
            "branch": "develop",
            "sha": "blob-1",
            "content": "aGVsbG8="
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": { "path": "README.md", "sha": "blob-2" },
            "commit": { "sha": "c2" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let stored = client_for(&server)
        .put_file(
            "demo",
            &FileWrite {
                branch: "develop".to_string(),
                path: "README.md".to_string(),
                content: "hello".to_string(),
                message: "docs".to_string(),
                sha: Some("blob-1".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(stored.sha, "blob-2");
}

#[tokio::test]
async fn test_put_new_file_omits_sha_field() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/repos/lab/demo/contents/CITATION.cff"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "content": { "path": "CITATION.cff", "sha": "blob-9" }
        })))
        .mount(&server)
        .await;

    client_for(&server)
        .put_file(
            "demo",
            &FileWrite {
                branch: "develop".to_string(),
                path: "CITATION.cff".to_string(),
                content: "cff-version: 1.2.0".to_string(),
                message: "citation".to_string(),
                sha: None,
            },
        )
        .await
        .unwrap();

    let requests = server.received_requests().await.expect("recording enabled");
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("sha").is_none());
    assert_eq!(body["message"], "citation");
}

#[tokio::test]
async fn test_put_file_conflict_maps_to_conflict_error() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/repos/lab/demo/contents/README.md"))
        .respond_with(ResponseTemplate::new(409).set_body_string("README.md does not match"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .put_file(
            "demo",
            &FileWrite {
                branch: "develop".to_string(),
                path: "README.md".to_string(),
                content: "x".to_string(),
                message: "m".to_string(),
                sha: Some("stale".to_string()),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Conflict { ref path, .. } if path == "README.md"));
}

#[tokio::test]
async fn test_create_pull_request_error_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/lab/demo/pulls"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .create_pull_request(
            "demo",
            &NewPullRequest {
                title: "t".to_string(),
                body: "b".to_string(),
                head: "develop".to_string(),
                base: "main".to_string(),
                maintainer_can_modify: true,
            },
        )
        .await
        .unwrap_err();
    match err {
        RemoteError::Api { status, body } => {
            assert_eq!(status, 403);
            assert_eq!(body, "forbidden");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_list_tags_preserves_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/lab/demo/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "v1.2.0", "commit": { "sha": "a" } },
            { "name": "v1.1.0", "commit": { "sha": "b" } }
        ])))
        .mount(&server)
        .await;

    let tags = client_for(&server).list_tags("demo").await.unwrap();
    let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["v1.2.0", "v1.1.0"]);
}
