//! TuneLab Core — domain types shared by every report stage.
//!
//! This crate contains the data model the analytics library consumes:
//! - Trade records (closed round-trip positions with P&L and excursions)
//! - Equity points (time-stamped portfolio value with precomputed
//!   drawdown/run-up fractions)
//! - Diagnostic events (the tagged union emitted by the simulation:
//!   indicator flips, condition changes, state transitions, special
//!   indicator lifecycle events)
//!
//! Everything here is an immutable fact produced upstream. The analytics
//! layer reads these types and never mutates them.

pub mod domain;

pub use domain::{
    ConditionSnapshot, ConditionType, DiagnosticEvent, EquityPoint, EventKind, ExitReason,
    PositionState, SpecialIndicatorAction, SpecialIndicatorKind, TradeDirection, TradeRecord,
    TransitionReason,
};
