//! HTTP-level tests for ZenodoClient against a wiremock server.

use forge_remote::{ArchivalService, Creator, DepositionMetadata, ZenodoClient, ZenodoConfig};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn metadata() -> DepositionMetadata {
    DepositionMetadata {
        title: "Research code: demo".to_string(),
        description: "Automated deposition".to_string(),
        upload_type: "software".to_string(),
        creators: vec![Creator {
            name: "Ada Lovelace".to_string(),
            affiliation: Some("Analytical Engines Ltd".to_string()),
            orcid: Some("0000-0002-1825-0097".to_string()),
        }],
        keywords: vec!["automation".to_string()],
        license: "CC-BY-4.0".to_string(),
        prereserve_doi: true,
    }
}

#[tokio::test]
async fn test_create_deposition_returns_reserved_doi() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/deposit/depositions"))
        .and(header("authorization", "Bearer zen-token"))
        .and(body_partial_json(json!({
            "metadata": { "upload_type": "software", "prereserve_doi": true }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 4242,
            "doi": "",
            "metadata": {
                "prereserve_doi": { "doi": "10.5281/zenodo.4242", "recid": 4242 }
            },
            "links": { "html": "https://zenodo.org/deposit/4242" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client =
        ZenodoClient::new(ZenodoConfig::new("zen-token").with_api_url(&server.uri())).unwrap();
    let deposition = client.create_deposition(&metadata()).await.unwrap();

    assert_eq!(deposition.id, 4242);
    assert_eq!(deposition.doi, "10.5281/zenodo.4242");
    assert_eq!(deposition.url, "https://zenodo.org/deposit/4242");
}

#[tokio::test]
async fn test_create_deposition_surfaces_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/deposit/depositions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
        .mount(&server)
        .await;

    let client =
        ZenodoClient::new(ZenodoConfig::new("bad").with_api_url(&server.uri())).unwrap();
    let err = client.create_deposition(&metadata()).await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert!(err.to_string().contains("invalid token"));
}
