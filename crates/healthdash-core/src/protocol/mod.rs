//! Treatment protocol definitions.
//!
//! Static data describing the dosing schedule, the active phase and the
//! longer-term plan. No behavior beyond simple lookups lives here.

mod phase;
mod plan;
mod schedule;

pub use phase::{ProtocolDocument, ProtocolPhase};
pub use plan::{
    maintenance_stage, phase_plan_for_week, MaintenanceStage, PhasePlan, PlanStage,
    PlannedSupplement,
};
pub use schedule::{hhmm, parse_time_of_day, ProtocolSchedule, ScheduleSlot, SupplementDose};
