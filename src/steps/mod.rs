pub(crate) mod model;
pub(crate) mod navigation;
pub(crate) mod source;
pub(crate) mod store;
