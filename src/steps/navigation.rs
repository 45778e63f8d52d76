//! Pure navigation derivation over a step list.
//!
//! Nothing here mutates state; [`resolve_navigation`] is O(steps) and cheap enough to call on
//! every store change.

use crate::steps::model::Step;

/// Label used for the backward navigation button.
pub const BACK_LABEL: &str = "Back";

/// Descriptor for a previous/next navigation target.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationStep {
    /// Id of the target step.
    pub id: String,
    /// Button label.
    pub label: String,
    /// Whether the transition is currently allowed.
    pub is_enabled: bool,
}

/// Validity of the active step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepValidity {
    /// The active step's `completed` flag.
    pub is_valid: bool,
    /// `is_valid` and a next step exists.
    pub can_advance: bool,
}

/// Everything the navigation UI needs, derived from the step list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepNavigation<'a> {
    /// Index of the active step, `None` when no step is active.
    pub active_index: Option<usize>,
    /// Step before the active one; always enabled when present.
    pub previous_step: Option<NavigationStep>,
    /// Step after the active one; enabled iff the active step is completed.
    pub next_step: Option<NavigationStep>,
    /// Every step completed. `false` for an empty list.
    pub all_steps_completed: bool,
    /// Validity of the active step.
    pub current_step_validity: StepValidity,
    /// The active step.
    pub current_step: Option<&'a Step>,
    /// Full data of the step before the active one.
    pub previous_step_data: Option<&'a Step>,
    /// Full data of the step after the active one.
    pub next_step_data: Option<&'a Step>,
    /// Number of completed steps.
    pub completed_count: usize,
    /// `round((active + 1) / len * 100)`, 0 when nothing is active.
    pub progress_percent: u8,
    /// All steps completed and the active step is the last one.
    pub can_finalize: bool,
}

impl StepNavigation<'_> {
    /// Active step is the first step.
    pub fn is_first_step(&self) -> bool {
        self.active_index == Some(0)
    }

    /// Active step is the last step.
    pub fn is_last_step(&self) -> bool {
        self.active_index.is_some() && self.next_step_data.is_none()
    }
}

/// Index of the first active step.
pub fn active_index(steps: &[Step]) -> Option<usize> {
    steps.iter().position(|s| s.active)
}

/// Derive navigation descriptors and completion state from `steps`.
pub fn resolve_navigation(steps: &[Step]) -> StepNavigation<'_> {
    let active = active_index(steps);
    let current_step = active.map(|i| &steps[i]);
    let previous_step_data = active.and_then(|i| i.checked_sub(1)).map(|i| &steps[i]);
    let next_step_data = active.and_then(|i| steps.get(i + 1));

    let is_valid = current_step.is_some_and(|s| s.completed);
    let can_advance = is_valid && next_step_data.is_some();

    let previous_step = previous_step_data.map(|s| NavigationStep {
        id: s.id.clone(),
        label: BACK_LABEL.to_string(),
        is_enabled: true,
    });
    let next_step = next_step_data.map(|s| NavigationStep {
        id: s.id.clone(),
        label: s.name.clone(),
        is_enabled: can_advance,
    });

    let completed_count = steps.iter().filter(|s| s.completed).count();
    let all_steps_completed = !steps.is_empty() && completed_count == steps.len();

    let progress_percent = match active {
        Some(i) => (((i + 1) as f64 / steps.len() as f64) * 100.0).round() as u8,
        None => 0,
    };

    StepNavigation {
        active_index: active,
        previous_step,
        next_step,
        all_steps_completed,
        current_step_validity: StepValidity {
            is_valid,
            can_advance,
        },
        current_step,
        previous_step_data,
        next_step_data,
        completed_count,
        progress_percent,
        can_finalize: all_steps_completed && active.is_some() && next_step_data.is_none(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/steps/navigation.rs"]
mod tests;
