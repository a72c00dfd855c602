//! mailcanvas: document model and editing engine for block-based email templates.
//!
//! Layers, innermost first:
//! - `domain`: element tree, palette and pure tree mutations
//! - `application`: undo/redo history, drag engine, HTML export, editor service
//! - `infrastructure`: template persistence and service wiring
//! - `cli`: command line front end

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;

pub mod util {
    pub mod testing;
}
