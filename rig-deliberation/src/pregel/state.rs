//! Workflow state abstraction for the Pregel runtime
//!
//! Defines how workflow state is updated and merged during supersteps.
//! The runtime collects updates from all vertices and applies them atomically
//! at the end of each superstep.

use super::vertex::StateUpdate;

/// Trait for workflow state managed by the Pregel runtime
///
/// # Example
///
/// ```ignore
/// #[derive(Clone, Default)]
/// struct CounterState {
///     total: u32,
/// }
///
/// impl WorkflowState for CounterState {
///     type Update = CounterUpdate;
///
///     fn apply_update(&self, update: Self::Update) -> Self {
///         let mut new = self.clone();
///         if let Some(total) = update.total {
///             new.total = total;
///         }
///         new
///     }
///
///     fn merge_updates(updates: Vec<Self::Update>) -> Self::Update {
///         CounterUpdate {
///             total: updates.into_iter().rev().find_map(|u| u.total),
///         }
///     }
/// }
/// ```
pub trait WorkflowState: Clone + Send + Sync + 'static {
    /// The update type produced by vertices
    type Update: StateUpdate;

    /// Apply an update to produce a new state
    ///
    /// This should be a pure function - the original state is not modified.
    fn apply_update(&self, update: Self::Update) -> Self;

    /// Merge multiple updates into a single update
    ///
    /// Updates arrive in vertex declaration order. For a field written by more
    /// than one update, the later one wins.
    fn merge_updates(updates: Vec<Self::Update>) -> Self::Update;

    /// Check if the state represents a terminal condition
    ///
    /// When true, the workflow will terminate regardless of pending vertices.
    fn is_terminal(&self) -> bool {
        false
    }

    /// Apply multiple updates in sequence
    ///
    /// Default implementation merges updates then applies the result.
    fn apply_updates(&self, updates: Vec<Self::Update>) -> Self {
        let updates: Vec<_> = updates.into_iter().filter(|u| !u.is_empty()).collect();
        if updates.is_empty() {
            return self.clone();
        }
        let merged = Self::merge_updates(updates);
        self.apply_update(merged)
    }
}
