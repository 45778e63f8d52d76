pub(crate) mod layers;
pub(crate) mod template;
