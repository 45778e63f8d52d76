//! Step-definition data as delivered by the configuration service.
//!
//! Field names follow the service's camelCase JSON. Only the fields the engine reads are typed;
//! unknown fields are ignored.

/// Whether a group allows one selection or many.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectType {
    /// Exclusive single choice.
    #[default]
    Radio,
    /// Cumulative multiple choice.
    Checkbox,
}

/// Image reference with an optional path template.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct VisualizerImage {
    /// Image path, possibly containing `{baseVisualizerPath}` / `{handingVisualizer}`.
    pub src: String,
}

/// Display tag attached to an item ("Most popular").
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Tag {
    /// Tag text; empty means no tag.
    pub label: String,
}

/// One selectable item inside an [`OptionGroup`].
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AvailableItem {
    /// Item identity. Also the visualizer layer id and bitmap cache key, so it must be unique
    /// per distinct image content.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Value submitted with the order.
    pub value: String,
    /// Display description.
    pub description: String,
    /// Thumbnail shown on the option card.
    pub image: Option<VisualizerImage>,
    /// Layer image template contributed to the product preview.
    pub visualizer_image: Option<VisualizerImage>,
    /// Stacking order as delivered (string, number, or null).
    #[serde(deserialize_with = "de_z_index")]
    pub z_index: Option<String>,
    /// Current selection state.
    pub is_selected: bool,
    /// Whether the card is shown.
    pub is_visible: bool,
    /// Highlight flag.
    pub is_most_popular: bool,
    /// Optional display tag.
    pub tag: Option<Tag>,
}

impl AvailableItem {
    /// Layer template, if the item contributes one.
    pub fn visualizer_src(&self) -> Option<&str> {
        self.visualizer_image.as_ref().map(|v| v.src.as_str())
    }
}

/// A question within a step and the items answering it.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptionGroup {
    /// Group identity, unique within its step.
    pub id: String,
    /// Question text.
    pub title: String,
    /// Secondary text.
    pub sub_title: String,
    /// Selection semantics; the service ships this as `type`.
    #[serde(alias = "type")]
    pub select_type: SelectType,
    /// Items offered by this group.
    pub available_items: Vec<AvailableItem>,
    /// Ids of selected items, in selection order.
    pub selected_item_ids: Vec<String>,
}

/// One screen of the configurator wizard.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Step {
    /// Step identity.
    pub id: String,
    /// Display name, also used as the "next" button label.
    pub name: String,
    /// Icon reference.
    pub icon: String,
    /// Exactly one step is active once steps are loaded.
    pub active: bool,
    /// Set when the user finishes the step; reset when navigating back into it.
    pub completed: bool,
    /// Option groups shown on this step.
    pub available_options: Vec<OptionGroup>,
}

impl Step {
    /// Minimal step with no options, mostly for tests and demos.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Every selected item across the step's groups, in traversal order.
    pub fn selected_items(&self) -> impl Iterator<Item = &AvailableItem> {
        self.available_options
            .iter()
            .flat_map(|g| g.available_items.iter())
            .filter(|i| i.is_selected)
    }
}

fn de_z_index<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    let raw: Option<Raw> = serde::Deserialize::deserialize(de)?;
    Ok(raw.map(|r| match r {
        Raw::Text(s) => s,
        Raw::Int(v) => v.to_string(),
        Raw::Float(v) => v.to_string(),
    }))
}

#[cfg(test)]
#[path = "../../tests/unit/steps/model.rs"]
mod tests;
