use serde::{Serialize, Serializer};
use std::fmt;

/// Operational context for a prediction run. Changes the recommendation
/// policy only, never the risk computation. Unrecognized values pass through
/// lower-cased and always yield "No recommendation".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scenario {
    General,
    EntryRush,
    MidEvent,
    Evacuation,
    Other(String),
}

impl Scenario {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "general" => Self::General,
            "entry_rush" => Self::EntryRush,
            "mid_event" => Self::MidEvent,
            "evacuation" => Self::Evacuation,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::General => "general",
            Self::EntryRush => "entry_rush",
            Self::MidEvent => "mid_event",
            Self::Evacuation => "evacuation",
            Self::Other(name) => name.as_str(),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Scenario {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Maps a risk value and scenario to an operator recommendation. Pure and
/// total over all floats; only `general` looks at the risk value.
pub fn recommend(risk: f64, scenario: &Scenario) -> &'static str {
    match scenario {
        Scenario::General => {
            if risk < 0.5 {
                "Safe to attend"
            } else {
                "Moderate, consider early arrival"
            }
        }
        Scenario::EntryRush => "Open extra gates",
        Scenario::MidEvent => "Redirect crowd to food/restroom areas",
        Scenario::Evacuation => "Activate emergency exits and guides",
        Scenario::Other(_) => "No recommendation",
    }
}
