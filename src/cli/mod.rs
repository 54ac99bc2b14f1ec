//! Operator CLI

pub(crate) mod commands;
pub(crate) mod config;
pub(crate) mod observability;
