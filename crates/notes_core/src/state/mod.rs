//! Client-side state: the application state, its reducer and its container.
//!
//! # Responsibility
//! - Keep all state transitions pure and enumerable.
//! - Give workflows and view layers one shared container to read and mutate.

pub mod app_state;
pub mod reducer;
pub mod store;
