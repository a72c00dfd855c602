//! Domain layer: the document tree and its pure operations
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod display;
pub mod error;
pub mod mutator;
pub mod node;
pub mod palette;
pub mod template;

pub use display::TreeDisplay;
pub use error::{DomainError, DomainResult};
pub use mutator::Duplicated;
pub use node::{
    ButtonContent, Content, ContentPatch, ImageContent, Node, NodeId, NodeKind, NodePatch, Style,
};
pub use palette::{create_columns, create_node, PaletteItem, MAX_COLUMNS, MIN_COLUMNS};
pub use template::{Location, Template, Visit, FORMAT_VERSION};
