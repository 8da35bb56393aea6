//! Archival (DOI) service abstraction

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::hosting::RemoteResult;

/// A creator entry in deposition metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,
}

/// Descriptive metadata submitted with a deposition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositionMetadata {
    pub title: String,
    pub description: String,
    pub upload_type: String,
    pub creators: Vec<Creator>,
    pub keywords: Vec<String>,
    pub license: String,
    /// Ask the service to reserve a DOI before publication.
    pub prereserve_doi: bool,
}

/// A created deposition with its reserved persistent identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposition {
    pub id: u64,
    pub doi: String,
    pub url: String,
}

/// Archival REST API operations.
#[async_trait]
pub trait ArchivalService: Send + Sync {
    /// Submit metadata and return the deposition with its reserved DOI.
    async fn create_deposition(&self, metadata: &DepositionMetadata) -> RemoteResult<Deposition>;
}
