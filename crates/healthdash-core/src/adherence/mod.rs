//! Dose matching and adherence aggregation.

mod aggregate;
mod matcher;
mod status;

use serde::{Deserialize, Serialize};

pub use aggregate::{
    daily_adherence, streak, weekly_adherence, DailyAdherence, WeeklyAdherence,
    DEFAULT_STREAK_THRESHOLD_PCT,
};
pub use matcher::{AliasEntry, AliasTable, DoseMatcher, MatchPolicy};
pub use status::{slot_badge, DoseState, SupplementStatus};

/// Adherence settings from the `[adherence]` config section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdherenceRules {
    #[serde(default = "default_streak_threshold_pct")]
    pub streak_threshold_pct: u8,
    #[serde(default)]
    pub match_policy: MatchPolicy,
    /// Replaces the built-in alias table when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aliases: Option<Vec<AliasEntry>>,
}

fn default_streak_threshold_pct() -> u8 {
    DEFAULT_STREAK_THRESHOLD_PCT
}

impl Default for AdherenceRules {
    fn default() -> Self {
        Self {
            streak_threshold_pct: default_streak_threshold_pct(),
            match_policy: MatchPolicy::default(),
            aliases: None,
        }
    }
}

impl AdherenceRules {
    pub fn alias_table(&self) -> AliasTable {
        match &self.aliases {
            Some(entries) => AliasTable::new(entries.clone()),
            None => AliasTable::default(),
        }
    }
}
