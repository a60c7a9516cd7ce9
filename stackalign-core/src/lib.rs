//! Core data structures and traits for stackalign
//!
//! This crate provides the value types shared by the registration engine:
//! n-dimensional feature points, density clusters, rigid transformations,
//! correspondences and matches, plus per-invocation configuration and the
//! capability traits implemented by `stackalign-algorithms`.

pub mod cluster;
pub mod config;
pub mod correspondence;
pub mod error;
pub mod point;
pub mod traits;
pub mod transform;

pub use cluster::*;
pub use config::*;
pub use correspondence::*;
pub use error::*;
pub use point::*;
pub use traits::*;
pub use transform::*;

/// Re-export of the nalgebra vector type backing feature points
pub use nalgebra::DVector;
