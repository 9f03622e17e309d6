pub(crate) mod decoder;
pub(crate) mod distribution;
pub(crate) mod encoder;
pub(crate) mod matrix;
