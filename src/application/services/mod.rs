//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services are concrete structs, not traits.

mod editor;
mod render;

pub use editor::{DropOutcome, EditorService};
pub use render::{render, render_node, HtmlRenderer, RenderOptions};
