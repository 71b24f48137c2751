use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What caused a fetch run. Scheduled runs come from the external cron
/// trigger; cache-miss and cache-expired runs are raised by the cache gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerType {
    Scheduled,
    Manual,
    CacheMiss,
    CacheExpired,
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheduled => write!(f, "scheduled"),
            Self::Manual => write!(f, "manual"),
            Self::CacheMiss => write!(f, "cache-miss"),
            Self::CacheExpired => write!(f, "cache-expired"),
        }
    }
}

impl FromStr for TriggerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scheduled" | "hourly" => Ok(Self::Scheduled),
            "manual" => Ok(Self::Manual),
            "cache-miss" => Ok(Self::CacheMiss),
            "cache-expired" => Ok(Self::CacheExpired),
            _ => Err(format!(
                "Invalid trigger: '{s}'. Use 'scheduled', 'manual', 'cache-miss' or 'cache-expired'"
            )),
        }
    }
}
