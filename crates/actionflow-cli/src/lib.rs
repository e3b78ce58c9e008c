//! Actionflow CLI library — command implementations shared by the
//! `actionflow` binary and its integration tests.

pub mod commands;
pub mod settings;
