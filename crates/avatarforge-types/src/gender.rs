//! Gender labels produced by the classifier and used to key assets.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Gender label for body-model and garment selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Neutral,
}

impl Gender {
    /// Returns the lowercase label used in file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "male" | "man" => Ok(Gender::Male),
            "female" | "woman" => Ok(Gender::Female),
            "neutral" => Ok(Gender::Neutral),
            other => Err(format!("unknown gender label '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels() {
        assert_eq!("male".parse::<Gender>(), Ok(Gender::Male));
        assert_eq!("Woman".parse::<Gender>(), Ok(Gender::Female));
        assert_eq!("neutral".parse::<Gender>(), Ok(Gender::Neutral));
        assert!("robot".parse::<Gender>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Gender::Female).unwrap(), "\"female\"");
    }
}
