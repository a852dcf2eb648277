//! `aptitude-core`: foundation building blocks shared by the assessment crates.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod error;
pub mod id;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use error::{DomainError, DomainResult};
pub use id::{SessionId, StudentId};
pub use value_object::ValueObject;
