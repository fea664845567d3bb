pub(crate) mod glyph;
pub(crate) mod normalize;
pub(crate) mod store;
