//! Builders that turn a layout pass into an output format.

pub mod svg;
