use forge_remote::fakes::{HostingCall, HostingOp, MemoryHostingService};
use repoforge_core::{Artifact, ArtifactPublisher, AutomationError, PublishKind};

fn readme(content: &str) -> Artifact {
    Artifact {
        branch: "develop".to_string(),
        path: "README.md".to_string(),
        message: "docs: generate README".to_string(),
        content: content.to_string(),
    }
}

fn put_shas(hosting: &MemoryHostingService) -> Vec<Option<String>> {
    hosting
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            HostingCall::PutFile { write, .. } => Some(write.sha),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn second_publish_updates_with_hash_from_first() {
    let hosting = MemoryHostingService::new("lab")
        .with_repository("demo")
        .with_branch("demo", "develop");
    let publisher = ArtifactPublisher::new(&hosting);

    let first = publisher
        .try_publish("demo", &readme("v1"))
        .await
        .expect("first publish");
    let second = publisher
        .try_publish("demo", &readme("v2"))
        .await
        .expect("second publish");

    assert_eq!(first.kind, PublishKind::Created);
    assert_eq!(second.kind, PublishKind::Updated);
    assert_eq!(put_shas(&hosting), vec![None, Some(first.file.sha.clone())]);
    assert_eq!(
        hosting.file_content("demo", "develop", "README.md").as_deref(),
        Some("v2")
    );
}

#[tokio::test]
async fn identical_content_is_written_again() {
    let hosting = MemoryHostingService::new("lab")
        .with_repository("demo")
        .with_branch("demo", "develop");
    let publisher = ArtifactPublisher::new(&hosting);

    assert!(publisher.publish("demo", &readme("same")).await);
    assert!(publisher.publish("demo", &readme("same")).await);

    assert_eq!(hosting.count(HostingOp::PutFile), 2);
}

#[tokio::test]
async fn pre_existing_file_is_never_written_without_hash() {
    let hosting = MemoryHostingService::new("lab")
        .with_repository("demo")
        .with_branch("demo", "develop")
        .with_file("demo", "develop", "README.md", "hand written");
    let publisher = ArtifactPublisher::new(&hosting);

    let published = publisher
        .try_publish("demo", &readme("generated"))
        .await
        .expect("publish");

    assert_eq!(published.kind, PublishKind::Updated);
    assert!(put_shas(&hosting).iter().all(Option::is_some));
}

#[tokio::test]
async fn missing_branch_is_reported_without_writing() {
    let hosting = MemoryHostingService::new("lab").with_repository("demo");
    let publisher = ArtifactPublisher::new(&hosting);

    let err = publisher
        .try_publish("demo", &readme("x"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AutomationError::MissingBranchHead { ref branch, .. } if branch == "develop"
    ));

    assert!(!publisher.publish("demo", &readme("x")).await);
    assert_eq!(hosting.count(HostingOp::GetFile), 0);
    assert_eq!(hosting.count(HostingOp::PutFile), 0);
}

#[tokio::test]
async fn write_failure_returns_false() {
    let hosting = MemoryHostingService::new("lab")
        .with_repository("demo")
        .with_branch("demo", "develop");
    hosting.fail_on(HostingOp::PutFile, 500);
    let publisher = ArtifactPublisher::new(&hosting);

    assert!(!publisher.publish("demo", &readme("x")).await);
    assert!(hosting.file_content("demo", "develop", "README.md").is_none());
}
