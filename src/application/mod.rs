//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic: history, drag resolution, export and
//! the editor service consumed by the UI.

pub mod drag;
pub mod error;
pub mod history;
pub mod services;

pub use drag::{
    CancelReason, DragEngine, DragSource, DragState, DropAction, DropSlot, Edge, HoverTarget,
    Point, Rect,
};
pub use error::{ApplicationError, ApplicationResult};
pub use history::{History, DEFAULT_HISTORY_CAPACITY};
