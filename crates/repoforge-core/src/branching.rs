//! Branch strategy resolution.

use serde::Serialize;

use crate::config::BranchStrategy;

/// Branch every plan starts from; working branches are cut from its tip.
pub const DEFAULT_BRANCH: &str = "main";

/// Branches created on every automated repository, regardless of strategy.
pub const WORKING_BRANCHES: [&str; 3] = [
    "develop",
    "research/enhancement",
    "manuscript/auto-generation",
];

/// Branch receiving generated documentation and workflows.
pub const CONTENT_BRANCH: &str = "develop";

/// Branch receiving the generated manuscript.
pub const MANUSCRIPT_BRANCH: &str = "manuscript/auto-generation";

/// Branch layout derived from a [`BranchStrategy`].
///
/// Entries ending in `/` are name prefixes (`feature/`), not branches.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BranchStrategyPlan {
    pub strategy: BranchStrategy,
    pub branches: Vec<String>,
    pub protected: Vec<String>,
    pub auto_merge: bool,
}

impl BranchStrategyPlan {
    pub fn is_protected(&self, branch: &str) -> bool {
        self.protected.iter().any(|b| b == branch)
    }

    /// Protected branches other than the default one.
    pub fn extra_protected(&self) -> impl Iterator<Item = &str> {
        self.protected
            .iter()
            .map(String::as_str)
            .filter(|b| *b != DEFAULT_BRANCH)
    }
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Resolve the plan for a strategy.
pub fn resolve(strategy: BranchStrategy) -> BranchStrategyPlan {
    let (branches, protected) = match strategy {
        BranchStrategy::Gitflow => (
            owned(&["main", "develop", "feature/", "release/", "hotfix/"]),
            owned(&["main", "develop"]),
        ),
        BranchStrategy::GithubFlow => (owned(&["main", "feature/"]), owned(&["main"])),
        BranchStrategy::ResearchFlow => (
            owned(&[
                "main",
                "develop",
                "feature/",
                "research/",
                "manuscript/",
                "release/",
            ]),
            owned(&["main", "develop"]),
        ),
    };

    BranchStrategyPlan {
        strategy,
        branches,
        protected,
        auto_merge: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_github_flow_plan() {
        let plan = resolve(BranchStrategy::GithubFlow);
        assert_eq!(plan.branches, vec!["main", "feature/"]);
        assert_eq!(plan.protected, vec!["main"]);
        assert!(plan.auto_merge);
        assert_eq!(plan.extra_protected().count(), 0);
    }

    #[test]
    fn test_research_flow_plan() {
        let plan = resolve(BranchStrategy::ResearchFlow);
        assert_eq!(
            plan.branches,
            vec!["main", "develop", "feature/", "research/", "manuscript/", "release/"]
        );
        assert_eq!(plan.protected, vec!["main", "develop"]);
        assert_eq!(plan.extra_protected().collect::<Vec<_>>(), vec!["develop"]);
    }

    #[test]
    fn test_gitflow_plan() {
        let plan = resolve(BranchStrategy::Gitflow);
        assert_eq!(
            plan.branches,
            vec!["main", "develop", "feature/", "release/", "hotfix/"]
        );
        assert!(plan.is_protected("develop"));
        assert!(!plan.is_protected("hotfix/"));
    }

    #[test]
    fn test_every_plan_protects_default_branch() {
        for strategy in [
            BranchStrategy::Gitflow,
            BranchStrategy::GithubFlow,
            BranchStrategy::ResearchFlow,
        ] {
            let plan = resolve(strategy);
            assert_eq!(plan.branches[0], DEFAULT_BRANCH);
            assert!(plan.is_protected(DEFAULT_BRANCH));
        }
    }
}
