//! Map-reduce key filters.
//!
//! Only the filter pipeline lives here; phases and job submission belong to
//! the transport.

pub mod filter;
mod parse;

pub use filter::{FilterList, KeyFilter, MapReduceFilter, Operand};
