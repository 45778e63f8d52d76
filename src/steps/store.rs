use crate::foundation::error::{PorticoError, PorticoResult};
use crate::steps::model::{SelectType, Step};
use crate::steps::navigation::{StepNavigation, active_index, resolve_navigation};

/// Lifecycle of the step list relative to the step-definition service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    /// No request in flight.
    #[default]
    Idle,
    /// Step definitions are being fetched.
    Loading,
    /// The last start attempt failed; see [`SelectionStore::error`].
    Failed,
}

/// Owner of the step list and every selection made in it.
///
/// All mutation goes through the methods below. Navigation methods that are not currently
/// permitted are silent no-ops and report `false`.
#[derive(Clone, Debug, Default)]
pub struct SelectionStore {
    steps: Vec<Step>,
    status: LoadStatus,
    error: Option<String>,
}

impl SelectionStore {
    /// Empty, uninitialized store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding `steps` in initial state.
    pub fn with_steps(steps: Vec<Step>) -> Self {
        let mut store = Self::new();
        store.replace_steps(steps);
        store
    }

    /// Read access to the step list.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Current load status.
    pub fn status(&self) -> LoadStatus {
        self.status
    }

    /// Error recorded by the last failed start.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub(crate) fn set_loading(&mut self) {
        self.status = LoadStatus::Loading;
        self.error = None;
    }

    pub(crate) fn set_failed(&mut self, err: &PorticoError) {
        self.status = LoadStatus::Failed;
        self.error = Some(err.to_string());
    }

    /// Replace the whole step list and put it in initial state: first step active, nothing
    /// completed. Selections carried by the definitions are kept.
    pub fn replace_steps(&mut self, steps: Vec<Step>) {
        self.steps = steps;
        for (i, step) in self.steps.iter_mut().enumerate() {
            step.active = i == 0;
            step.completed = false;
        }
        self.status = LoadStatus::Idle;
        self.error = None;
    }

    /// Derived navigation state for the current step list.
    pub fn navigation(&self) -> StepNavigation<'_> {
        resolve_navigation(&self.steps)
    }

    /// Move forward one step. Requires the active step to be completed and a next step to exist.
    pub fn advance(&mut self) -> bool {
        let Some(i) = active_index(&self.steps) else {
            tracing::debug!("advance ignored: no active step");
            return false;
        };
        if !self.steps[i].completed || i + 1 >= self.steps.len() {
            tracing::debug!(index = i, "advance ignored: step not completed or last");
            return false;
        }
        self.steps[i].active = false;
        self.steps[i + 1].active = true;
        true
    }

    /// Move back one step. The step landed on is reset to incomplete.
    pub fn retreat(&mut self) -> bool {
        let Some(i) = active_index(&self.steps) else {
            tracing::debug!("retreat ignored: no active step");
            return false;
        };
        if i == 0 {
            tracing::debug!("retreat ignored: already on first step");
            return false;
        }
        self.steps[i].active = false;
        let prev = &mut self.steps[i - 1];
        prev.active = true;
        prev.completed = false;
        true
    }

    /// Mark the active step completed. Idempotent.
    pub fn mark_completed(&mut self) -> bool {
        match self.steps.iter_mut().find(|s| s.active) {
            Some(step) => {
                step.completed = true;
                true
            }
            None => false,
        }
    }

    /// Jump to `target`, which must not be past the active step.
    ///
    /// Steps before `target` become completed, `target` becomes active and incomplete, and every
    /// later step is reset.
    pub fn jump_to(&mut self, target: usize) -> bool {
        let Some(current) = active_index(&self.steps) else {
            return false;
        };
        if target > current {
            tracing::debug!(target, current, "jump ignored: cannot skip ahead");
            return false;
        }
        for (i, step) in self.steps.iter_mut().enumerate() {
            step.active = i == target;
            step.completed = i < target;
        }
        true
    }

    /// Index of the step with id `step_id`.
    pub fn step_index(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == step_id)
    }

    /// Select `item_id` in group `option_id` of the active step.
    ///
    /// Radio groups are exclusive; reselecting the selected radio item changes nothing. Checkbox
    /// groups toggle the item.
    pub fn select_item(&mut self, option_id: &str, item_id: &str) -> PorticoResult<()> {
        let i = active_index(&self.steps)
            .ok_or_else(|| PorticoError::validation("no active step to select in"))?;
        self.select_item_in(i, option_id, item_id)
    }

    /// Select `item_id` in group `option_id` of the step at `step_index`.
    pub fn select_item_in(
        &mut self,
        step_index: usize,
        option_id: &str,
        item_id: &str,
    ) -> PorticoResult<()> {
        let step = self
            .steps
            .get_mut(step_index)
            .ok_or_else(|| PorticoError::validation(format!("no step at index {step_index}")))?;
        let Some(group) = step
            .available_options
            .iter_mut()
            .find(|g| g.id == option_id)
        else {
            return Err(PorticoError::validation(format!(
                "step '{}' has no option group '{option_id}'",
                step.id
            )));
        };
        let pos = group
            .available_items
            .iter()
            .position(|it| it.id == item_id)
            .ok_or_else(|| {
                PorticoError::validation(format!(
                    "option group '{option_id}' has no item '{item_id}'"
                ))
            })?;

        match group.select_type {
            SelectType::Radio => {
                for (j, it) in group.available_items.iter_mut().enumerate() {
                    it.is_selected = j == pos;
                }
                group.selected_item_ids = vec![item_id.to_string()];
            }
            SelectType::Checkbox => {
                let item = &mut group.available_items[pos];
                item.is_selected = !item.is_selected;
                if item.is_selected {
                    group.selected_item_ids.push(item_id.to_string());
                } else {
                    group.selected_item_ids.retain(|id| id != item_id);
                }
            }
        }
        Ok(())
    }

    /// Clear `item_id` in group `option_id` of the active step. Unknown ids are ignored.
    pub fn deselect_item(&mut self, option_id: &str, item_id: &str) {
        let Some(i) = active_index(&self.steps) else {
            return;
        };
        let Some(group) = self.steps[i]
            .available_options
            .iter_mut()
            .find(|g| g.id == option_id)
        else {
            return;
        };
        for it in group.available_items.iter_mut().filter(|it| it.id == item_id) {
            it.is_selected = false;
        }
        group.selected_item_ids.retain(|id| id != item_id);
    }

    /// Back to the first step with every selection cleared.
    pub fn reset(&mut self) {
        for (i, step) in self.steps.iter_mut().enumerate() {
            step.active = i == 0;
            step.completed = false;
            for group in &mut step.available_options {
                group.selected_item_ids.clear();
                for it in &mut group.available_items {
                    it.is_selected = false;
                }
            }
        }
    }

    /// Fire `on_finalize` if the configuration is complete and the last step is active.
    ///
    /// The callback carries no payload; collaborators read selections from the store.
    pub fn finalize<F: FnOnce()>(&self, on_finalize: F) -> bool {
        if !self.navigation().can_finalize {
            tracing::debug!("finalize ignored: configuration incomplete");
            return false;
        }
        on_finalize();
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/steps/store.rs"]
mod tests;
