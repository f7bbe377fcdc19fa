//! Model catalogue.
//!
//! The inference service accepts a fixed set of model identifiers. The
//! identifier is what goes over the wire; the label is what the UI shows.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the models the inference service knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ModelChoice {
    #[serde(rename = "mistral")]
    Mistral,
    #[serde(rename = "alpha")]
    Alpha,
    #[serde(rename = "phi-2")]
    Phi2,
    #[serde(rename = "phi-1_5")]
    Phi15,
    #[default]
    #[serde(rename = "instruct")]
    Instruct,
}

impl ModelChoice {
    /// All models, in selector order.
    pub const ALL: [ModelChoice; 5] = [
        Self::Mistral,
        Self::Alpha,
        Self::Phi2,
        Self::Phi15,
        Self::Instruct,
    ];

    /// Identifier sent to the inference service.
    pub fn id(self) -> &'static str {
        match self {
            Self::Mistral => "mistral",
            Self::Alpha => "alpha",
            Self::Phi2 => "phi-2",
            Self::Phi15 => "phi-1_5",
            Self::Instruct => "instruct",
        }
    }

    /// Human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Mistral => "Mistral-7B",
            Self::Alpha => "Zephyr-7B",
            Self::Phi2 => "Microsoft-Phi-2",
            Self::Phi15 => "Microsoft-Phi-1-5",
            Self::Instruct => "Falcon-7B",
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|m| *m == self).unwrap_or(0)
    }

    /// Next model in selector order, wrapping around.
    #[must_use]
    pub fn next(self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    /// Previous model in selector order, wrapping around.
    #[must_use]
    pub fn prev(self) -> Self {
        let len = Self::ALL.len();
        Self::ALL[(self.position() + len - 1) % len]
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Returned when parsing an identifier outside the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown model: {0} (expected one of: mistral, alpha, phi-2, phi-1_5, instruct)")]
pub struct UnknownModel(pub String);

impl FromStr for ModelChoice {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.id() == s)
            .ok_or_else(|| UnknownModel(s.to_string()))
    }
}
