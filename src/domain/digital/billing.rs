//! Subscription billing cycles

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Enumerated subscription period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BillingCycle {
    #[serde(rename = "1 month")]
    Monthly,
    #[serde(rename = "3 month")]
    Quarterly,
    #[serde(rename = "6 month")]
    SemiAnnual,
    #[serde(rename = "12 month")]
    Annual,
}

impl BillingCycle {
    pub const ALL: [BillingCycle; 4] = [
        Self::Monthly,
        Self::Quarterly,
        Self::SemiAnnual,
        Self::Annual,
    ];

    /// Number of months covered by one payment
    pub fn months(&self) -> u32 {
        match self {
            Self::Monthly => 1,
            Self::Quarterly => 3,
            Self::SemiAnnual => 6,
            Self::Annual => 12,
        }
    }

    /// Canonical label as stored in the database
    pub fn label(&self) -> &'static str {
        match self {
            Self::Monthly => "1 month",
            Self::Quarterly => "3 month",
            Self::SemiAnnual => "6 month",
            Self::Annual => "12 month",
        }
    }

    /// Lenient parse; `None` for empty or unrecognized labels
    pub fn parse(label: &str) -> Option<Self> {
        let normalized = label.trim().to_lowercase();
        let normalized = normalized.strip_suffix('s').unwrap_or(&normalized);

        Self::ALL
            .into_iter()
            .find(|cycle| cycle.label() == normalized)
    }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BillingCycle {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            DomainError::validation(format!(
                "Unknown billing cycle: '{}'. Valid cycles: 1 month, 3 month, 6 month, 12 month",
                s
            ))
        })
    }
}
