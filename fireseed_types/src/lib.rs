//! Shared types for fireseed: the loaded dataset, document addressing and the
//! Firestore REST value encoding.

pub mod dataset;
pub mod document;
pub mod encode;

pub use dataset::{Dataset, ShapeError};
pub use document::{DocumentPath, DocumentWrite};
