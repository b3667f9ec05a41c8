//! Command implementations

pub mod compare;
