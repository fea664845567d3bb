pub(crate) mod compile;
