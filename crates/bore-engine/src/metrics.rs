//! Per-tick metrics for the field manager.
//!
//! [`TickMetrics`] captures what one tick did and how long it took, plus
//! running totals for the events a host wants to alert on.

/// Metrics collected during a single tick.
///
/// Durations are in microseconds. Fields documented as cumulative count
/// since the manager was created.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickMetrics {
    /// Wall-clock time for the whole tick.
    pub total_us: u64,
    /// Time spent in sub-steps.
    pub step_us: u64,
    /// Time spent decimating and batching audio.
    pub sound_us: u64,
    /// Sub-steps run this tick.
    pub sub_steps: u32,
    /// Control messages applied this tick.
    pub controls_applied: u32,
    /// Audio batches handed to the queue this tick.
    pub batches_sent: u32,
    /// Audio batches dropped on a full queue this tick.
    pub batches_skipped: u32,
    /// Whether a staging field was swapped in this tick.
    pub swapped: bool,
    /// Retiring fields freed this tick.
    pub retired_freed: u32,
    /// Cumulative number of hot-swaps.
    pub swaps: u64,
    /// Cumulative number of builds that failed, panicked or timed out.
    pub build_failures: u64,
    /// Cumulative number of rebuild requests rejected up front.
    pub rejected_rebuilds: u64,
    /// Cumulative number of ticks skipped because the active field was
    /// frozen.
    pub frozen_ticks: u64,
}
