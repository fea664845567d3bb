pub(crate) mod gcode;
pub(crate) mod sink;
