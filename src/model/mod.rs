//! Document model types for form content representation.
//!
//! This module defines the structural schema consumed by both exporters:
//! ordered content blocks, table grids with merged-cell regions, and the
//! document wrapper with its header metadata. It holds no behavior beyond
//! the merge-region invariants.

mod block;
mod document;
mod table;

pub use block::ContentBlock;
pub use document::Document;
pub use table::{CellData, TableData};
