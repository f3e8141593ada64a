use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which way a simulation session drives the subject's environment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    /// Escalating thermal stress.
    HeatUp,
    /// Recovery toward cooler, drier conditions.
    CoolDown,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::HeatUp => "heat-up",
            Direction::CoolDown => "cool-down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "heat-up" | "heatup" | "heat_up" => Ok(Direction::HeatUp),
            "cool-down" | "cooldown" | "cool_down" => Ok(Direction::CoolDown),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}
