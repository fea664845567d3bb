pub(crate) mod engine;
pub(crate) mod page;
pub(crate) mod selector;
