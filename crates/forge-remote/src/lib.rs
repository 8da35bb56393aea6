//! Forge-Remote: hosting and archival service clients for repoforge
//!
//! This crate is the outbound boundary of the automation engine. It wraps
//! the two REST services the engine talks to behind async traits:
//!
//! - [`HostingService`]: repositories, branch refs and protection, file
//!   contents, pull requests, releases and tags ([`GitHubClient`])
//! - [`ArchivalService`]: metadata deposition with DOI reservation
//!   ([`ZenodoClient`])
//!
//! The [`fakes`] module provides in-memory implementations for tests.

pub mod archival;
mod error;
pub mod fakes;
pub mod github;
pub mod hosting;
pub mod zenodo;

pub use archival::{ArchivalService, Creator, Deposition, DepositionMetadata};
pub use error::RemoteError;
pub use github::{GitHubClient, GitHubConfig};
pub use hosting::{
    BranchProtection, FileMetadata, FileWrite, HostingService, NewPullRequest, NewRelease,
    NewRepository, PullRequest, Release, RemoteResult, RepositoryInfo, RepositorySettings,
    RequiredReviews, RequiredStatusChecks, Tag,
};
pub use zenodo::{ZenodoClient, ZenodoConfig};
