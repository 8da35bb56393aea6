//! DOI issuance through the archival service.

use forge_remote::{ArchivalService, Creator, Deposition, DepositionMetadata};

use super::StepContext;
use crate::domain::error::Result;

pub struct DoiIssuer<'a> {
    archival: &'a dyn ArchivalService,
}

impl<'a> DoiIssuer<'a> {
    pub fn new(archival: &'a dyn ArchivalService) -> Self {
        Self { archival }
    }

    /// Deposition metadata for the repository, crediting the principal.
    pub fn metadata(ctx: &StepContext<'_>) -> DepositionMetadata {
        let principal = ctx.principal;
        let affiliation =
            (!principal.institution.is_empty()).then(|| principal.institution.clone());
        DepositionMetadata {
            title: format!("Research code: {}", ctx.repository),
            description: format!(
                "Automated research code repository {} maintained by {}.",
                ctx.hosting.repository_url(ctx.repository),
                principal.display_name()
            ),
            upload_type: "software".to_string(),
            creators: vec![Creator {
                name: principal.name.clone(),
                affiliation,
                orcid: principal.orcid.clone(),
            }],
            keywords: vec![
                "research software".to_string(),
                "automation".to_string(),
                ctx.config.owner.clone(),
            ],
            license: "CC-BY-4.0".to_string(),
            prereserve_doi: true,
        }
    }

    /// Create a deposition with a pre-reserved DOI.
    pub async fn issue(&self, ctx: &StepContext<'_>) -> Result<Deposition> {
        let deposition = self.archival.create_deposition(&Self::metadata(ctx)).await?;
        Ok(deposition)
    }
}
