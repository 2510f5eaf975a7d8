//! # Healthdash Core Library
//!
//! Decision engine for a personal health-tracking dashboard that follows a
//! supplement treatment protocol. Given logged doses, daily vitals, nightly
//! sleep and symptom entries, it works out which doses are due or missed,
//! adherence percentages and streaks, threshold alerts and plain-language
//! symptom insights.
//!
//! ## Architecture
//!
//! - **Evaluation**: [`evaluate`] is a pure function of a [`DashboardInput`]
//!   snapshot, the current local time and [`Settings`]
//! - **Storage**: JSON record files read by [`DataStore`] and TOML
//!   configuration managed by [`Config`]
//! - **Clock**: the only place wall-clock time enters; everything else
//!   takes `now` as an argument
//!
//! ## Key Components
//!
//! - [`SlotTiming`]: slot windows, the current slot and the next dose
//! - [`DoseMatcher`]: decides whether a scheduled dose was taken
//! - [`AlertEngine`]: HRV, sleep and protocol alerts
//! - [`correlate`]: symptom/biometric insight strings

pub mod adherence;
pub mod alerts;
pub mod clock;
pub mod correlation;
pub mod error;
pub mod evaluation;
pub mod protocol;
pub mod records;
pub mod reports;
pub mod risk;
pub mod series;
pub mod storage;
pub mod timing;
pub mod wearables;

pub use adherence::{AdherenceRules, DailyAdherence, DoseMatcher, DoseState, MatchPolicy, WeeklyAdherence};
pub use alerts::{Alert, AlertCategory, AlertEngine, AlertPriority, AlertThresholds};
pub use clock::{Clock, FixedClock, SystemClock, Timezone};
pub use correlation::{correlate, CorrelationRules, SymptomTrend};
pub use error::{ConfigError, CoreError, ValidationError};
pub use evaluation::{evaluate, DashboardInput, DashboardReport, Settings};
pub use protocol::{ProtocolDocument, ProtocolPhase, ProtocolSchedule, ScheduleSlot};
pub use records::{
    DieoffEpisode, DoseRecord, MealRecord, SleepRecord, SymptomRecord, VitalRecord,
};
pub use storage::{Config, DataStore};
pub use timing::{NextDose, SlotTiming, TimingRules};
