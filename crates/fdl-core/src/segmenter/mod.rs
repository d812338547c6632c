//! Range math and chunk planning.
//!
//! Splits a resource into N contiguous inclusive byte ranges; the last chunk
//! takes the remainder so every other chunk has the same size.

mod range;

pub use range::{max_chunks_for, plan_chunks, Chunk, PlanError};
