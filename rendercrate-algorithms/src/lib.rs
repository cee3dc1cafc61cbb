//! # rendercrate algorithms
//!
//! Geometric queries on meshes. The intersection module casts rays and line
//! segments against a triangle mesh indexed by an R*-tree.

pub mod intersection;

// Re-export commonly used items
pub use intersection::*;
