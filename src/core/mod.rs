//! Core pipeline logic: catalog, validation, rendering, local state, orchestration.

pub mod catalog;
pub mod pipeline;
pub mod renderer;
pub mod state;
pub mod types;
pub mod validator;
