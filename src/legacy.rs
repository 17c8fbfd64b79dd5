//! Deprecated paths kept for code written against 0.1.

#![allow(deprecated)]

#[deprecated(since = "0.2.0", note = "use riak_http::mapreduce instead")]
pub mod filter {
    pub use crate::mapreduce::filter::{FilterList, KeyFilter, MapReduceFilter, Operand};

    /// Former name of [`KeyFilter`].
    pub type MapReduceKeyFilter = KeyFilter;
}
