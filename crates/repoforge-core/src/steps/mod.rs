//! The automation steps.
//!
//! Each step is a free function (or a small manager type) over a
//! [`StepContext`] that performs its remote calls and returns a
//! [`StepReport`](crate::domain::StepReport). Bookkeeping of outcomes is left
//! to the engine.

pub mod branches;
pub mod content;
pub mod doi;
pub mod pipeline;
pub mod pull_request;
pub mod release;
pub mod setup;

use forge_remote::{ArchivalService, HostingService};

use crate::config::AutomationConfig;
use crate::domain::PrincipalInfo;
use crate::templates::RenderContext;

pub use doi::DoiIssuer;
pub use pull_request::PullRequestManager;
pub use release::ReleaseManager;

/// Borrowed view of everything a step needs for one repository.
#[derive(Clone, Copy)]
pub struct StepContext<'a> {
    pub repository: &'a str,
    pub hosting: &'a dyn HostingService,
    pub archival: Option<&'a dyn ArchivalService>,
    pub config: &'a AutomationConfig,
    pub principal: &'a PrincipalInfo,
}

impl<'a> StepContext<'a> {
    pub fn render_context(&self) -> RenderContext<'a> {
        RenderContext::new(
            self.repository,
            self.hosting.repository_url(self.repository),
            self.config,
            self.principal,
        )
    }
}
