//! Identity of the principal investigator attached to generated artifacts.

use serde::{Deserialize, Serialize};

/// Static identity record used in citations, DOI metadata, PR and release bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrincipalInfo {
    pub name: String,
    pub credentials: String,
    pub title: String,
    pub institution: String,
    pub email: String,
    /// ORCID iD without the `https://orcid.org/` prefix.
    pub orcid: Option<String>,
}

impl Default for PrincipalInfo {
    fn default() -> Self {
        Self {
            name: "Research Team".to_string(),
            credentials: String::new(),
            title: String::new(),
            institution: String::new(),
            email: String::new(),
            orcid: None,
        }
    }
}

impl PrincipalInfo {
    /// Name followed by credentials, e.g. `Ada Lovelace, PhD`.
    pub fn display_name(&self) -> String {
        if self.credentials.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.credentials)
        }
    }

    pub fn orcid_url(&self) -> Option<String> {
        self.orcid
            .as_ref()
            .map(|id| format!("https://orcid.org/{}", id))
    }

    /// Split `name` into (family, given) for CFF authors. Single-word names
    /// are treated as a family name.
    pub fn split_name(&self) -> (String, Option<String>) {
        let mut parts: Vec<&str> = self.name.split_whitespace().collect();
        match parts.len() {
            0 => (String::new(), None),
            1 => (parts[0].to_string(), None),
            _ => {
                let family = parts.pop().unwrap_or_default().to_string();
                (family, Some(parts.join(" ")))
            }
        }
    }
}
