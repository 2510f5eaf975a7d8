use serde::{Deserialize, Serialize};

/// Derived state of one scheduled supplement in one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoseState {
    /// A matching dose was logged near the slot time
    Taken,
    /// No matching dose and the grace period has elapsed
    Missed,
    /// No matching dose yet, still within the grace period
    Pending,
}

impl DoseState {
    /// Badge precedence: Taken beats Missed beats Pending.
    fn rank(self) -> u8 {
        match self {
            DoseState::Taken => 2,
            DoseState::Missed => 1,
            DoseState::Pending => 0,
        }
    }
}

/// Status of one supplement within one slot for today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplementStatus {
    pub slot: String,
    pub supplement_name: String,
    pub state: DoseState,
}

/// Aggregate badge for a slot, picking the highest-precedence state.
/// An empty slice yields `None`.
pub fn slot_badge(statuses: &[SupplementStatus]) -> Option<DoseState> {
    statuses.iter().map(|s| s.state).max_by_key(|s| s.rank())
}
