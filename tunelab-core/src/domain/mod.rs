//! Domain types produced by the simulation and consumed by the report layer.

pub mod equity;
pub mod event;
pub mod trade;

pub use equity::EquityPoint;
pub use event::{
    ConditionSnapshot, ConditionType, DiagnosticEvent, EventKind, PositionState,
    SpecialIndicatorAction, SpecialIndicatorKind, TransitionReason,
};
pub use trade::{ExitReason, TradeDirection, TradeRecord};
