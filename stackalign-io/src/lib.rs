//! # stackalign-io
//!
//! The collaborator boundary of the registration engine: reading point-set
//! files and emitting/parsing correspondence records. The engine itself
//! never performs file I/O.

pub mod point_set;
pub mod records;

pub use point_set::*;
pub use records::*;
