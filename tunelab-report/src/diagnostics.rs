//! Algo diagnostics — what the strategy's indicators actually did.
//!
//! Consumes the raw diagnostic event stream recorded during simulation and
//! answers the tuning questions: which indicators matter, how close did
//! each condition come to firing without doing so, and where did the time
//! go across position states.
//!
//! The producer does not guarantee per-kind ordering, so each analyzer
//! sorts its filtered subsequence by bar index on a local copy before the
//! single-pass scan. Caller-owned data is never mutated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tunelab_core::{ConditionType, DiagnosticEvent, PositionState, TransitionReason};

use crate::metrics::ExitReasonCounts;

/// Full diagnostic report over one simulation's event stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlgoMetrics {
    /// One row per indicator key, sorted descending by usefulness score.
    pub indicator_analyses: Vec<IndicatorAnalysis>,
    /// One row per condition type.
    pub near_miss_analyses: Vec<NearMissAnalysis>,
    pub state_distribution: StateDistribution,
    /// Transitions landing on CASH or TIMEOUT, bucketed by reason.
    pub exits_by_reason: ExitReasonCounts,
    pub condition_triggers: ConditionTriggerCounts,
    pub event_counts: EventCounts,
}

/// How one indicator behaved over the run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndicatorAnalysis {
    pub indicator_key: String,
    pub indicator_type: String,
    pub condition: ConditionType,
    pub required: bool,
    pub flip_count: usize,
    /// Fraction of bars the indicator evaluated true.
    pub pct_time_true: f64,
    /// Flips recorded as the deciding factor on a condition firing.
    pub triggering_flips: usize,
    /// Flips to false that left this indicator as the single remaining
    /// unmet required sub-condition.
    pub blocking_flips: usize,
    /// Heuristic score in [0, 100], base 50.
    pub usefulness_score: f64,
}

/// How close a condition came to firing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NearMissAnalysis {
    pub condition: ConditionType,
    /// Number of flips whose snapshot distance was 0.
    pub trigger_count: usize,
    /// Minimum non-zero distance ever observed; 0 when every flip
    /// triggered (or no flips occurred at all).
    pub closest_approach_without_trigger: u32,
    /// Observed snapshot distances and how often each occurred.
    pub distance_histogram: BTreeMap<u32, usize>,
    pub approaches: Vec<ApproachSequence>,
}

/// A contiguous run of non-triggering evaluations tracking how close a
/// condition got before retreating or firing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApproachSequence {
    pub start_bar: usize,
    pub end_bar: usize,
    pub min_distance: u32,
    pub triggered: bool,
}

/// Time spent in each position state.
///
/// TIMEOUT is folded into the reported flat percentage and average stay
/// (backward-compatible reporting) while the underlying bar counts keep it
/// distinct.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StateDistribution {
    pub pct_flat: f64,
    pub pct_long: f64,
    pub pct_short: f64,
    pub avg_flat_stay: f64,
    pub avg_long_stay: f64,
    pub avg_short_stay: f64,
    pub bars_in_cash: usize,
    pub bars_in_long: usize,
    pub bars_in_short: usize,
    pub bars_in_timeout: usize,
}

/// Condition-change events with new state true, per condition type.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConditionTriggerCounts {
    pub long_entry: usize,
    pub long_exit: usize,
    pub short_entry: usize,
    pub short_exit: usize,
}

impl ConditionTriggerCounts {
    fn record(&mut self, condition: ConditionType) {
        match condition {
            ConditionType::LongEntry => self.long_entry += 1,
            ConditionType::LongExit => self.long_exit += 1,
            ConditionType::ShortEntry => self.short_entry += 1,
            ConditionType::ShortExit => self.short_exit += 1,
        }
    }
}

/// Raw per-kind event counts, for sanity-checking the stream.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventCounts {
    pub indicator_flips: usize,
    pub condition_changes: usize,
    pub state_transitions: usize,
    pub special_indicator_events: usize,
}

/// Analyze a full event stream. `total_bars` is the simulation length in
/// bars and bounds every time-based accounting below.
pub fn analyze_events(events: &[DiagnosticEvent], total_bars: usize) -> AlgoMetrics {
    AlgoMetrics {
        indicator_analyses: indicator_analyses(events, total_bars),
        near_miss_analyses: near_miss_analyses(events),
        state_distribution: state_distribution(events, total_bars),
        exits_by_reason: exit_breakdown(events),
        condition_triggers: condition_trigger_counts(events),
        event_counts: event_counts(events),
    }
}

// ─── Indicator analysis ──────────────────────────────────────────────

/// Borrowed view of one indicator-flip event.
struct Flip<'a> {
    bar_index: usize,
    indicator_key: &'a str,
    indicator_type: &'a str,
    condition: ConditionType,
    required: bool,
    previous_value: bool,
    new_value: bool,
    distance: u32,
}

fn collect_flips(events: &[DiagnosticEvent]) -> Vec<Flip<'_>> {
    events
        .iter()
        .filter_map(|event| match event {
            DiagnosticEvent::IndicatorFlip {
                bar_index,
                indicator_key,
                indicator_type,
                condition,
                required,
                previous_value,
                new_value,
                snapshot,
            } => Some(Flip {
                bar_index: *bar_index,
                indicator_key,
                indicator_type,
                condition: *condition,
                required: *required,
                previous_value: *previous_value,
                new_value: *new_value,
                distance: snapshot.distance_from_trigger,
            }),
            _ => None,
        })
        .collect()
}

/// One row per indicator key, sorted descending by usefulness score.
pub fn indicator_analyses(events: &[DiagnosticEvent], total_bars: usize) -> Vec<IndicatorAnalysis> {
    // Deciding-factor citations per indicator key.
    let mut triggering: BTreeMap<&str, usize> = BTreeMap::new();
    for event in events {
        if let DiagnosticEvent::ConditionChange {
            new_state: true,
            triggering_indicator: Some(key),
            ..
        } = event
        {
            *triggering.entry(key.as_str()).or_insert(0) += 1;
        }
    }

    let mut groups: BTreeMap<&str, Vec<Flip<'_>>> = BTreeMap::new();
    for flip in collect_flips(events) {
        groups.entry(flip.indicator_key).or_default().push(flip);
    }

    let mut rows: Vec<IndicatorAnalysis> = groups
        .into_iter()
        .map(|(key, mut flips)| {
            flips.sort_by_key(|f| f.bar_index);

            let (true_bars, false_bars) = true_false_bars(&flips, total_bars);
            let time_total = true_bars + false_bars;
            let pct_time_true = if time_total > 0 {
                true_bars as f64 / time_total as f64
            } else {
                0.0
            };

            let blocking = flips
                .iter()
                .filter(|f| f.required && !f.new_value && f.distance == 1)
                .count();
            let triggered = triggering.get(key).copied().unwrap_or(0);
            let required = flips[0].required;

            IndicatorAnalysis {
                indicator_key: key.to_string(),
                indicator_type: flips[0].indicator_type.to_string(),
                condition: flips[0].condition,
                required,
                flip_count: flips.len(),
                pct_time_true,
                triggering_flips: triggered,
                blocking_flips: blocking,
                usefulness_score: usefulness_score(
                    flips.len(),
                    total_bars,
                    pct_time_true,
                    required,
                    triggered,
                    blocking,
                ),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.usefulness_score
            .partial_cmp(&a.usefulness_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.indicator_key.cmp(&b.indicator_key))
    });
    rows
}

/// Bars spent true vs. false: initial state from the first flip's previous
/// value, gaps between consecutive flips, and the tail segment out to
/// `total_bars`.
fn true_false_bars(flips: &[Flip<'_>], total_bars: usize) -> (usize, usize) {
    let mut true_bars = 0usize;
    let mut false_bars = 0usize;
    let mut state = flips[0].previous_value;
    let mut prev_bar = 0usize;

    for flip in flips {
        let span = flip.bar_index.saturating_sub(prev_bar);
        if state {
            true_bars += span;
        } else {
            false_bars += span;
        }
        state = flip.new_value;
        prev_bar = flip.bar_index;
    }

    let tail = total_bars.saturating_sub(prev_bar);
    if state {
        true_bars += tail;
    } else {
        false_bars += tail;
    }

    (true_bars, false_bars)
}

/// Heuristic usefulness score, base 50, clamped to [0, 100].
///
/// Flip rate: −10 above 50% of bars, +15 within [1%, 20%], −15 below 0.1%.
/// Time balance: +15 for 30–70% true, −20 above 95% or below 5%.
/// Required indicators add 3 points per triggering flip and 2 per blocking
/// flip, each contribution capped at 15.
fn usefulness_score(
    flip_count: usize,
    total_bars: usize,
    pct_time_true: f64,
    required: bool,
    triggering: usize,
    blocking: usize,
) -> f64 {
    let mut score = 50.0;

    if total_bars > 0 {
        let flip_rate = flip_count as f64 / total_bars as f64;
        if flip_rate > 0.5 {
            score -= 10.0;
        } else if (0.01..=0.20).contains(&flip_rate) {
            score += 15.0;
        } else if flip_rate < 0.001 {
            score -= 15.0;
        }
    }

    if (0.30..=0.70).contains(&pct_time_true) {
        score += 15.0;
    } else if pct_time_true > 0.95 || pct_time_true < 0.05 {
        score -= 20.0;
    }

    if required {
        score += (3.0 * triggering as f64).min(15.0);
        score += (2.0 * blocking as f64).min(15.0);
    }

    score.clamp(0.0, 100.0)
}

// ─── Near-miss analysis ──────────────────────────────────────────────

/// One row per condition type, in `ConditionType::ALL` order.
pub fn near_miss_analyses(events: &[DiagnosticEvent]) -> Vec<NearMissAnalysis> {
    let flips = collect_flips(events);
    ConditionType::ALL
        .iter()
        .map(|&condition| {
            let mut subset: Vec<&Flip<'_>> =
                flips.iter().filter(|f| f.condition == condition).collect();
            subset.sort_by_key(|f| f.bar_index);
            near_miss_for_condition(condition, &subset)
        })
        .collect()
}

/// Open approach being tracked during the scan.
struct OpenApproach {
    start_bar: usize,
    min_distance: u32,
}

fn near_miss_for_condition(condition: ConditionType, flips: &[&Flip<'_>]) -> NearMissAnalysis {
    let mut histogram: BTreeMap<u32, usize> = BTreeMap::new();
    let mut approaches = Vec::new();
    let mut open: Option<OpenApproach> = None;
    let mut trigger_count = 0usize;
    let mut closest_without_trigger: Option<u32> = None;
    let mut last_bar = 0usize;

    for flip in flips {
        let distance = flip.distance;
        *histogram.entry(distance).or_insert(0) += 1;
        last_bar = flip.bar_index;

        if distance == 0 {
            trigger_count += 1;
            if let Some(approach) = open.take() {
                approaches.push(ApproachSequence {
                    start_bar: approach.start_bar,
                    end_bar: flip.bar_index,
                    min_distance: approach.min_distance,
                    triggered: true,
                });
            }
        } else {
            closest_without_trigger = Some(match closest_without_trigger {
                Some(best) => best.min(distance),
                None => distance,
            });

            match &mut open {
                None => {
                    open = Some(OpenApproach {
                        start_bar: flip.bar_index,
                        min_distance: distance,
                    });
                }
                Some(approach) => {
                    if distance < approach.min_distance {
                        approach.min_distance = distance;
                    } else if distance > approach.min_distance + 1 {
                        // Retreated past the tolerance: close and restart.
                        approaches.push(ApproachSequence {
                            start_bar: approach.start_bar,
                            end_bar: flip.bar_index,
                            min_distance: approach.min_distance,
                            triggered: false,
                        });
                        open = Some(OpenApproach {
                            start_bar: flip.bar_index,
                            min_distance: distance,
                        });
                    }
                }
            }
        }
    }

    // An approach still open at the end of the stream is emitted as-is.
    if let Some(approach) = open {
        approaches.push(ApproachSequence {
            start_bar: approach.start_bar,
            end_bar: last_bar,
            min_distance: approach.min_distance,
            triggered: false,
        });
    }

    NearMissAnalysis {
        condition,
        trigger_count,
        closest_approach_without_trigger: closest_without_trigger.unwrap_or(0),
        distance_histogram: histogram,
        approaches,
    }
}

// ─── State distribution ──────────────────────────────────────────────

/// Time distribution across CASH/LONG/SHORT/TIMEOUT.
pub fn state_distribution(events: &[DiagnosticEvent], total_bars: usize) -> StateDistribution {
    let mut transitions: Vec<(usize, PositionState, PositionState)> = events
        .iter()
        .filter_map(|event| match event {
            DiagnosticEvent::StateTransition {
                bar_index,
                from,
                to,
                ..
            } => Some((*bar_index, *from, *to)),
            _ => None,
        })
        .collect();
    transitions.sort_by_key(|t| t.0);

    let mut bars = [0usize; 4];
    let mut stays = [0usize; 4];

    if transitions.is_empty() {
        // The whole run is one flat stay.
        if total_bars > 0 {
            bars[state_index(PositionState::Cash)] = total_bars;
            stays[state_index(PositionState::Cash)] = 1;
        }
        return distribution_from(bars, stays, total_bars);
    }

    // Leading segment: bar 0 up to the first transition, in its `from` state.
    let (first_bar, first_from, first_to) = transitions[0];
    add_segment(&mut bars, &mut stays, first_from, first_bar);

    let mut current = first_to;
    let mut segment_start = first_bar;
    for &(bar, _, to) in &transitions[1..] {
        add_segment(&mut bars, &mut stays, current, bar - segment_start);
        current = to;
        segment_start = bar;
    }
    add_segment(
        &mut bars,
        &mut stays,
        current,
        total_bars.saturating_sub(segment_start),
    );

    distribution_from(bars, stays, total_bars)
}

/// Zero-length segments do not count as stays.
fn add_segment(bars: &mut [usize; 4], stays: &mut [usize; 4], state: PositionState, span: usize) {
    if span > 0 {
        bars[state_index(state)] += span;
        stays[state_index(state)] += 1;
    }
}

fn state_index(state: PositionState) -> usize {
    match state {
        PositionState::Cash => 0,
        PositionState::Long => 1,
        PositionState::Short => 2,
        PositionState::Timeout => 3,
    }
}

fn distribution_from(bars: [usize; 4], stays: [usize; 4], total_bars: usize) -> StateDistribution {
    let pct = |count: usize| {
        if total_bars > 0 {
            count as f64 / total_bars as f64
        } else {
            0.0
        }
    };
    let avg = |count: usize, stay_count: usize| {
        if stay_count > 0 {
            count as f64 / stay_count as f64
        } else {
            0.0
        }
    };

    let flat_bars = bars[0] + bars[3];
    let flat_stays = stays[0] + stays[3];

    StateDistribution {
        // Zero total bars still reports an all-flat run.
        pct_flat: if total_bars > 0 { pct(flat_bars) } else { 1.0 },
        pct_long: pct(bars[1]),
        pct_short: pct(bars[2]),
        avg_flat_stay: avg(flat_bars, flat_stays),
        avg_long_stay: avg(bars[1], stays[1]),
        avg_short_stay: avg(bars[2], stays[2]),
        bars_in_cash: bars[0],
        bars_in_long: bars[1],
        bars_in_short: bars[2],
        bars_in_timeout: bars[3],
    }
}

// ─── Counters ────────────────────────────────────────────────────────

/// Transitions landing on CASH or TIMEOUT, bucketed by reason.
pub fn exit_breakdown(events: &[DiagnosticEvent]) -> ExitReasonCounts {
    let mut counts = ExitReasonCounts::default();
    for event in events {
        if let DiagnosticEvent::StateTransition {
            to,
            reason: Some(reason),
            ..
        } = event
        {
            if matches!(to, PositionState::Cash | PositionState::Timeout) {
                match reason {
                    TransitionReason::ExitSignal => counts.signal += 1,
                    TransitionReason::StopLoss => counts.stop_loss += 1,
                    TransitionReason::TakeProfit => counts.take_profit += 1,
                    TransitionReason::TrailingStop => counts.trailing_stop += 1,
                    TransitionReason::EndOfBacktest => counts.end_of_backtest += 1,
                }
            }
        }
    }
    counts
}

/// Condition-change events with new state true, per condition type.
pub fn condition_trigger_counts(events: &[DiagnosticEvent]) -> ConditionTriggerCounts {
    let mut counts = ConditionTriggerCounts::default();
    for event in events {
        if let DiagnosticEvent::ConditionChange {
            condition,
            new_state: true,
            ..
        } = event
        {
            counts.record(*condition);
        }
    }
    counts
}

/// Raw per-kind counts.
pub fn event_counts(events: &[DiagnosticEvent]) -> EventCounts {
    let mut counts = EventCounts::default();
    for event in events {
        match event {
            DiagnosticEvent::IndicatorFlip { .. } => counts.indicator_flips += 1,
            DiagnosticEvent::ConditionChange { .. } => counts.condition_changes += 1,
            DiagnosticEvent::StateTransition { .. } => counts.state_transitions += 1,
            DiagnosticEvent::SpecialIndicator { .. } => counts.special_indicator_events += 1,
        }
    }
    counts
}
