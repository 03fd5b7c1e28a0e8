use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Domain a user never wants tracked. Subdomains are excluded too.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExcludedDomain {
    pub domain: String,
    pub created_at: DateTime<Utc>,
}

impl ExcludedDomain {
    pub fn covers(&self, domain: &str) -> bool {
        domain_is_covered(domain, &self.domain)
    }
}

pub fn domain_is_covered(domain: &str, excluded: &str) -> bool {
    domain == excluded
        || domain
            .strip_suffix(excluded)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
