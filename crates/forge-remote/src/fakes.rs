//! In-memory fakes for the remote services (testing only)
//!
//! `MemoryHostingService` models repositories, branches, files, tags, pull
//! requests and releases closely enough to exercise the conditional-write
//! protocol, and keeps a log of every call so tests can assert on what was
//! (or was not) sent. `MemoryArchivalService` hands out sequential DOIs.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::archival::{ArchivalService, Deposition, DepositionMetadata};
use crate::error::RemoteError;
use crate::hosting::*;

// ---------------------------------------------------------------------------
// MemoryHostingService
// ---------------------------------------------------------------------------

/// Operation selector used for failure injection and call counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostingOp {
    GetRepository,
    CreateRepository,
    UpdateRepository,
    ProtectBranch,
    GetBranchHead,
    CreateBranch,
    GetFile,
    PutFile,
    CreatePullRequest,
    CreateRelease,
    ListTags,
}

/// A recorded call against the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostingCall {
    GetRepository { repo: String },
    CreateRepository { repo: String },
    UpdateRepository { repo: String, settings: RepositorySettings },
    ProtectBranch { repo: String, branch: String },
    GetBranchHead { repo: String, branch: String },
    CreateBranch { repo: String, branch: String, sha: String },
    GetFile { repo: String, path: String, branch: String },
    PutFile { repo: String, write: FileWrite },
    CreatePullRequest { repo: String, head: String, base: String },
    CreateRelease { repo: String, tag: String },
    ListTags { repo: String },
}

impl HostingCall {
    pub fn op(&self) -> HostingOp {
        match self {
            HostingCall::GetRepository { .. } => HostingOp::GetRepository,
            HostingCall::CreateRepository { .. } => HostingOp::CreateRepository,
            HostingCall::UpdateRepository { .. } => HostingOp::UpdateRepository,
            HostingCall::ProtectBranch { .. } => HostingOp::ProtectBranch,
            HostingCall::GetBranchHead { .. } => HostingOp::GetBranchHead,
            HostingCall::CreateBranch { .. } => HostingOp::CreateBranch,
            HostingCall::GetFile { .. } => HostingOp::GetFile,
            HostingCall::PutFile { .. } => HostingOp::PutFile,
            HostingCall::CreatePullRequest { .. } => HostingOp::CreatePullRequest,
            HostingCall::CreateRelease { .. } => HostingOp::CreateRelease,
            HostingCall::ListTags { .. } => HostingOp::ListTags,
        }
    }
}

#[derive(Debug, Clone)]
struct StoredFile {
    sha: String,
    content: String,
}

#[derive(Debug)]
struct FakeRepo {
    info: RepositoryInfo,
    branches: BTreeMap<String, String>,
    files: HashMap<(String, String), StoredFile>,
    tags: Vec<String>,
    protected: BTreeSet<String>,
    pulls: Vec<PullRequest>,
    releases: Vec<Release>,
}

#[derive(Debug, Default)]
struct HostingState {
    repos: HashMap<String, FakeRepo>,
    calls: Vec<HostingCall>,
    failures: HashMap<HostingOp, u16>,
    failing_branches: HashSet<String>,
    commits: u64,
}

impl HostingState {
    fn next_commit(&mut self) -> String {
        self.commits += 1;
        blob_sha(&format!("commit:{}", self.commits))
    }

    fn check_failure(&self, op: HostingOp) -> RemoteResult<()> {
        match self.failures.get(&op) {
            Some(status) => Err(RemoteError::Api {
                status: *status,
                body: format!("injected failure for {:?}", op),
            }),
            None => Ok(()),
        }
    }

    fn repo_mut(&mut self, repo: &str) -> RemoteResult<&mut FakeRepo> {
        self.repos
            .get_mut(repo)
            .ok_or_else(|| RemoteError::Api {
                status: 404,
                body: format!("repository {} not found", repo),
            })
    }
}

fn blob_sha(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// In-memory hosting service.
#[derive(Debug)]
pub struct MemoryHostingService {
    owner: String,
    state: Mutex<HostingState>,
}

impl MemoryHostingService {
    pub fn new(owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            state: Mutex::new(HostingState::default()),
        }
    }

    /// Seed an initialised repository with a `main` branch.
    pub fn with_repository(self, repo: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let head = state.next_commit();
            let fake = self.new_repo(repo, Some(head));
            state.repos.insert(repo.to_string(), fake);
        }
        self
    }

    /// Seed an extra branch at the current `main` tip.
    pub fn with_branch(self, repo: &str, branch: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let fake = state.repos.get_mut(repo).unwrap();
            let head = fake.branches.get("main").cloned().unwrap_or_default();
            fake.branches.insert(branch.to_string(), head);
        }
        self
    }

    /// Seed a tag (pushed as the most recent one).
    pub fn with_tag(self, repo: &str, tag: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .repos
            .get_mut(repo)
            .unwrap()
            .tags
            .insert(0, tag.to_string());
        self
    }

    /// Seed a file on a branch.
    pub fn with_file(self, repo: &str, branch: &str, path: &str, content: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .repos
            .get_mut(repo)
            .unwrap()
            .files
            .insert(
                (branch.to_string(), path.to_string()),
                StoredFile {
                    sha: blob_sha(content),
                    content: content.to_string(),
                },
            );
        self
    }

    /// Make every subsequent call of `op` fail with the given HTTP status.
    pub fn fail_on(&self, op: HostingOp, status: u16) {
        self.state.lock().unwrap().failures.insert(op, status);
    }

    /// Make writes to `branch` fail, leaving other branches working.
    pub fn fail_writes_to(&self, branch: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_branches
            .insert(branch.to_string());
    }

    /// All calls in the order they were received.
    pub fn calls(&self) -> Vec<HostingCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of calls of the given kind.
    pub fn count(&self, op: HostingOp) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.op() == op)
            .count()
    }

    pub fn repository_exists(&self, repo: &str) -> bool {
        self.state.lock().unwrap().repos.contains_key(repo)
    }

    pub fn branches(&self, repo: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .repos
            .get(repo)
            .map(|r| r.branches.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn protected_branches(&self, repo: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .repos
            .get(repo)
            .map(|r| r.protected.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn file_content(&self, repo: &str, branch: &str, path: &str) -> Option<String> {
        self.state.lock().unwrap().repos.get(repo).and_then(|r| {
            r.files
                .get(&(branch.to_string(), path.to_string()))
                .map(|f| f.content.clone())
        })
    }

    pub fn pull_requests(&self, repo: &str) -> Vec<PullRequest> {
        self.state
            .lock()
            .unwrap()
            .repos
            .get(repo)
            .map(|r| r.pulls.clone())
            .unwrap_or_default()
    }

    pub fn releases(&self, repo: &str) -> Vec<Release> {
        self.state
            .lock()
            .unwrap()
            .repos
            .get(repo)
            .map(|r| r.releases.clone())
            .unwrap_or_default()
    }

    fn new_repo(&self, repo: &str, main_head: Option<String>) -> FakeRepo {
        let mut branches = BTreeMap::new();
        if let Some(head) = main_head {
            branches.insert("main".to_string(), head);
        }
        FakeRepo {
            info: RepositoryInfo {
                name: repo.to_string(),
                full_name: format!("{}/{}", self.owner, repo),
                html_url: self.repository_url(repo),
                default_branch: Some("main".to_string()),
            },
            branches,
            files: HashMap::new(),
            tags: Vec::new(),
            protected: BTreeSet::new(),
            pulls: Vec::new(),
            releases: Vec::new(),
        }
    }

    fn begin(&self, call: HostingCall) -> std::sync::MutexGuard<'_, HostingState> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state
    }
}

#[async_trait]
impl HostingService for MemoryHostingService {
    fn owner(&self) -> &str {
        &self.owner
    }

    fn repository_url(&self, repo: &str) -> String {
        format!("https://github.test/{}/{}", self.owner, repo)
    }

    async fn get_repository(&self, repo: &str) -> RemoteResult<Option<RepositoryInfo>> {
        let state = self.begin(HostingCall::GetRepository {
            repo: repo.to_string(),
        });
        state.check_failure(HostingOp::GetRepository)?;
        Ok(state.repos.get(repo).map(|r| r.info.clone()))
    }

    async fn create_repository(&self, request: &NewRepository) -> RemoteResult<RepositoryInfo> {
        let mut state = self.begin(HostingCall::CreateRepository {
            repo: request.name.clone(),
        });
        state.check_failure(HostingOp::CreateRepository)?;
        if state.repos.contains_key(&request.name) {
            return Err(RemoteError::Api {
                status: 422,
                body: "name already exists on this account".to_string(),
            });
        }
        let head = if request.auto_init {
            Some(state.next_commit())
        } else {
            None
        };
        let fake = self.new_repo(&request.name, head);
        let info = fake.info.clone();
        state.repos.insert(request.name.clone(), fake);
        Ok(info)
    }

    async fn update_repository(
        &self,
        repo: &str,
        settings: &RepositorySettings,
    ) -> RemoteResult<()> {
        let mut state = self.begin(HostingCall::UpdateRepository {
            repo: repo.to_string(),
            settings: settings.clone(),
        });
        state.check_failure(HostingOp::UpdateRepository)?;
        let fake = state.repo_mut(repo)?;
        if let Some(branch) = &settings.default_branch {
            fake.info.default_branch = Some(branch.clone());
        }
        Ok(())
    }

    async fn protect_branch(
        &self,
        repo: &str,
        branch: &str,
        _protection: &BranchProtection,
    ) -> RemoteResult<()> {
        let mut state = self.begin(HostingCall::ProtectBranch {
            repo: repo.to_string(),
            branch: branch.to_string(),
        });
        state.check_failure(HostingOp::ProtectBranch)?;
        let fake = state.repo_mut(repo)?;
        if !fake.branches.contains_key(branch) {
            return Err(RemoteError::Api {
                status: 404,
                body: "Branch not found".to_string(),
            });
        }
        fake.protected.insert(branch.to_string());
        Ok(())
    }

    async fn get_branch_head(&self, repo: &str, branch: &str) -> RemoteResult<Option<String>> {
        let state = self.begin(HostingCall::GetBranchHead {
            repo: repo.to_string(),
            branch: branch.to_string(),
        });
        state.check_failure(HostingOp::GetBranchHead)?;
        Ok(state
            .repos
            .get(repo)
            .and_then(|r| r.branches.get(branch).cloned()))
    }

    async fn create_branch(&self, repo: &str, branch: &str, sha: &str) -> RemoteResult<()> {
        let mut state = self.begin(HostingCall::CreateBranch {
            repo: repo.to_string(),
            branch: branch.to_string(),
            sha: sha.to_string(),
        });
        state.check_failure(HostingOp::CreateBranch)?;
        let fake = state.repo_mut(repo)?;
        if fake.branches.contains_key(branch) {
            return Err(RemoteError::AlreadyExists(format!("branch {}", branch)));
        }
        fake.branches.insert(branch.to_string(), sha.to_string());
        Ok(())
    }

    async fn get_file(
        &self,
        repo: &str,
        path: &str,
        branch: &str,
    ) -> RemoteResult<Option<FileMetadata>> {
        let state = self.begin(HostingCall::GetFile {
            repo: repo.to_string(),
            path: path.to_string(),
            branch: branch.to_string(),
        });
        state.check_failure(HostingOp::GetFile)?;
        Ok(state.repos.get(repo).and_then(|r| {
            r.files
                .get(&(branch.to_string(), path.to_string()))
                .map(|f| FileMetadata {
                    path: path.to_string(),
                    sha: f.sha.clone(),
                })
        }))
    }

    async fn put_file(&self, repo: &str, write: &FileWrite) -> RemoteResult<FileMetadata> {
        let mut state = self.begin(HostingCall::PutFile {
            repo: repo.to_string(),
            write: write.clone(),
        });
        state.check_failure(HostingOp::PutFile)?;
        if state.failing_branches.contains(&write.branch) {
            return Err(RemoteError::Api {
                status: 403,
                body: format!("writes to {} are not permitted", write.branch),
            });
        }
        let commit = state.next_commit();
        let fake = state.repo_mut(repo)?;
        if !fake.branches.contains_key(&write.branch) {
            return Err(RemoteError::Api {
                status: 404,
                body: format!("Branch {} not found", write.branch),
            });
        }

        let key = (write.branch.clone(), write.path.clone());
        match (fake.files.get(&key), &write.sha) {
            (Some(_), None) => {
                return Err(RemoteError::Api {
                    status: 422,
                    body: "\"sha\" wasn't supplied".to_string(),
                })
            }
            (Some(existing), Some(sha)) if existing.sha != *sha => {
                return Err(RemoteError::Conflict {
                    path: write.path.clone(),
                    body: format!("{} does not match {}", write.path, sha),
                })
            }
            _ => {}
        }

        let stored = StoredFile {
            sha: blob_sha(&write.content),
            content: write.content.clone(),
        };
        let meta = FileMetadata {
            path: write.path.clone(),
            sha: stored.sha.clone(),
        };
        fake.files.insert(key, stored);
        fake.branches.insert(write.branch.clone(), commit);
        Ok(meta)
    }

    async fn create_pull_request(
        &self,
        repo: &str,
        request: &NewPullRequest,
    ) -> RemoteResult<PullRequest> {
        let mut state = self.begin(HostingCall::CreatePullRequest {
            repo: repo.to_string(),
            head: request.head.clone(),
            base: request.base.clone(),
        });
        state.check_failure(HostingOp::CreatePullRequest)?;
        let fake = state.repo_mut(repo)?;
        if !fake.branches.contains_key(&request.head) || !fake.branches.contains_key(&request.base)
        {
            return Err(RemoteError::Api {
                status: 422,
                body: "Validation Failed: head or base does not exist".to_string(),
            });
        }
        let number = fake.pulls.len() as u64 + 1;
        let pr = PullRequest {
            number,
            html_url: format!("{}/pull/{}", fake.info.html_url, number),
        };
        fake.pulls.push(pr.clone());
        Ok(pr)
    }

    async fn create_release(&self, repo: &str, request: &NewRelease) -> RemoteResult<Release> {
        let mut state = self.begin(HostingCall::CreateRelease {
            repo: repo.to_string(),
            tag: request.tag_name.clone(),
        });
        state.check_failure(HostingOp::CreateRelease)?;
        let fake = state.repo_mut(repo)?;
        if fake.tags.contains(&request.tag_name) {
            return Err(RemoteError::Api {
                status: 422,
                body: "Validation Failed: tag_name already_exists".to_string(),
            });
        }
        fake.tags.insert(0, request.tag_name.clone());
        let release = Release {
            tag_name: request.tag_name.clone(),
            html_url: format!("{}/releases/tag/{}", fake.info.html_url, request.tag_name),
        };
        fake.releases.push(release.clone());
        Ok(release)
    }

    async fn list_tags(&self, repo: &str) -> RemoteResult<Vec<Tag>> {
        let state = self.begin(HostingCall::ListTags {
            repo: repo.to_string(),
        });
        state.check_failure(HostingOp::ListTags)?;
        Ok(state
            .repos
            .get(repo)
            .map(|r| r.tags.iter().map(|t| Tag { name: t.clone() }).collect())
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// MemoryArchivalService
// ---------------------------------------------------------------------------

/// In-memory archival service handing out `10.5281/zenodo.<n>` DOIs.
#[derive(Debug, Default)]
pub struct MemoryArchivalService {
    submissions: Mutex<Vec<DepositionMetadata>>,
    failure: Mutex<Option<u16>>,
}

impl MemoryArchivalService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every deposition fails with the given HTTP status.
    pub fn failing(status: u16) -> Self {
        let service = Self::default();
        *service.failure.lock().unwrap() = Some(status);
        service
    }

    pub fn submissions(&self) -> Vec<DepositionMetadata> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArchivalService for MemoryArchivalService {
    async fn create_deposition(&self, metadata: &DepositionMetadata) -> RemoteResult<Deposition> {
        let mut submissions = self.submissions.lock().unwrap();
        submissions.push(metadata.clone());
        if let Some(status) = *self.failure.lock().unwrap() {
            return Err(RemoteError::Api {
                status,
                body: "injected deposition failure".to_string(),
            });
        }
        let id = 1000 + submissions.len() as u64;
        Ok(Deposition {
            id,
            doi: format!("10.5281/zenodo.{}", id),
            url: format!("https://zenodo.test/deposit/{}", id),
        })
    }
}
