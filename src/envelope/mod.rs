//! Result envelopes
//!
//! Merges a page of rows, its continuation, the count and the literal
//! statement into the response the console renders. Optional sorting applies
//! to the rows of that page only.

mod assembler;
mod sorter;

pub use assembler::{CountFailure, EnvelopeAssembler, ResultEnvelope};
pub use sorter::{RowSorter, SortDirection, SortSpec};
