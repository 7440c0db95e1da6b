//! Diagnostic events — the tagged union emitted by the simulation.
//!
//! Every event carries the bar index (discrete simulation time step) at
//! which it was observed. The stream is append-only; per-kind ordering is
//! NOT guaranteed by the producer, so analyzers sort their filtered
//! subsequence by bar index before processing.

use serde::{Deserialize, Serialize};

/// One diagnostic fact recorded during simulation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticEvent {
    /// An indicator's boolean evaluation changed.
    IndicatorFlip {
        bar_index: usize,
        /// Stable identifier for the indicator instance.
        indicator_key: String,
        /// Indicator family, e.g. "rsi" or "ma_crossover".
        indicator_type: String,
        /// Which entry/exit condition this indicator belongs to.
        condition: ConditionType,
        /// Whether the indicator is a required (non-optional) component
        /// of its condition.
        required: bool,
        previous_value: bool,
        new_value: bool,
        /// Condition state immediately after the flip.
        snapshot: ConditionSnapshot,
    },

    /// An entry/exit condition's aggregate state changed.
    ConditionChange {
        bar_index: usize,
        condition: ConditionType,
        new_state: bool,
        /// The indicator whose flip decided the change; present only when
        /// `new_state` is true.
        triggering_indicator: Option<String>,
    },

    /// The position state machine moved between states.
    StateTransition {
        bar_index: usize,
        from: PositionState,
        to: PositionState,
        /// Why the transition happened, when applicable.
        reason: Option<TransitionReason>,
    },

    /// Lifecycle event for a stop/target/trailing/balance indicator.
    /// Counted but not deeply analyzed.
    SpecialIndicator {
        bar_index: usize,
        indicator: SpecialIndicatorKind,
        action: SpecialIndicatorAction,
    },
}

impl DiagnosticEvent {
    /// Bar index the event was observed at.
    pub fn bar_index(&self) -> usize {
        match self {
            Self::IndicatorFlip { bar_index, .. }
            | Self::ConditionChange { bar_index, .. }
            | Self::StateTransition { bar_index, .. }
            | Self::SpecialIndicator { bar_index, .. } => *bar_index,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::IndicatorFlip { .. } => EventKind::IndicatorFlip,
            Self::ConditionChange { .. } => EventKind::ConditionChange,
            Self::StateTransition { .. } => EventKind::StateTransition,
            Self::SpecialIndicator { .. } => EventKind::SpecialIndicator,
        }
    }
}

/// Discriminant of `DiagnosticEvent`, for counting and filtering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    IndicatorFlip,
    ConditionChange,
    StateTransition,
    SpecialIndicator,
}

/// Condition state captured at the moment of an indicator flip.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConditionSnapshot {
    /// Number of still-unmet required sub-conditions; 0 means the
    /// condition fired.
    pub distance_from_trigger: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionType {
    LongEntry,
    LongExit,
    ShortEntry,
    ShortExit,
}

impl ConditionType {
    pub const ALL: [Self; 4] = [
        Self::LongEntry,
        Self::LongExit,
        Self::ShortEntry,
        Self::ShortExit,
    ];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionState {
    Cash,
    Long,
    Short,
    Timeout,
}

/// Why the position state machine transitioned, when the producer knows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionReason {
    ExitSignal,
    StopLoss,
    TakeProfit,
    TrailingStop,
    EndOfBacktest,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpecialIndicatorKind {
    StopLoss,
    TakeProfit,
    TrailingStop,
    Balance,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpecialIndicatorAction {
    Set,
    Update,
    Hit,
}
