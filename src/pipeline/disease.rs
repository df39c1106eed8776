//! Closed disease vocabulary
//!
//! The classification stage picks from this fixed list. The prompt text and the
//! validation of parsed results are both derived from the same canonical names,
//! so adding a disease means adding a variant here and nothing else.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Visible conditions the classification stage may report.
///
/// `Unknown` is the explicit catch-all the model is instructed to use when
/// nothing else fits; it is still a valid, gate-eligible classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Disease {
    Acne,
    Eczema,
    Psoriasis,
    #[serde(rename = "Fungal Infection")]
    FungalInfection,
    Vitiligo,
    Dermatitis,
    Conjunctivitis,
    #[serde(rename = "Oral Ulcer")]
    OralUlcer,
    Rash,
    Unknown,
}

impl Disease {
    /// All variants, in the order they appear in the classification prompt
    pub const ALL: [Disease; 10] = [
        Disease::Acne,
        Disease::Eczema,
        Disease::Psoriasis,
        Disease::FungalInfection,
        Disease::Vitiligo,
        Disease::Dermatitis,
        Disease::Conjunctivitis,
        Disease::OralUlcer,
        Disease::Rash,
        Disease::Unknown,
    ];

    /// Canonical display name, exactly as enumerated in the prompt
    pub fn as_str(&self) -> &'static str {
        match self {
            Disease::Acne => "Acne",
            Disease::Eczema => "Eczema",
            Disease::Psoriasis => "Psoriasis",
            Disease::FungalInfection => "Fungal Infection",
            Disease::Vitiligo => "Vitiligo",
            Disease::Dermatitis => "Dermatitis",
            Disease::Conjunctivitis => "Conjunctivitis",
            Disease::OralUlcer => "Oral Ulcer",
            Disease::Rash => "Rash",
            Disease::Unknown => "Unknown",
        }
    }

    /// Comma-joined vocabulary for the classification prompt
    pub fn prompt_vocabulary() -> String {
        Self::ALL
            .iter()
            .map(Disease::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Disease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unparsed name, for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDiseaseName(pub String);

impl FromStr for Disease {
    type Err = UnknownDiseaseName;

    /// Matches canonical names, ignoring surrounding whitespace and ASCII case.
    /// Anything else is out of vocabulary.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Disease::ALL
            .iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(name))
            .copied()
            .ok_or_else(|| UnknownDiseaseName(s.to_string()))
    }
}
