//! Event-sourced aggregate traits.
//!
//! A test session is the only aggregate today; its state is nothing but the fold
//! of the events on its stream.

use crate::error::{DomainError, DomainResult};

/// Identity and version of an aggregate.
pub trait AggregateRoot {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;

    /// Number of events applied so far; 0 for a fresh instance.
    fn version(&self) -> u64;
}

/// Optimistic concurrency expectation for a command.
///
/// A host that loaded a session at version `n` and submits an answer with
/// `Exact(n)` is rejected if another request advanced the session in between.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ExpectedVersion {
    #[default]
    Any,
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }

    pub fn check(self, actual: u64) -> DomainResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(DomainError::conflict(format!(
                "stale session version (expected: {self:?}, actual: {actual})"
            )))
        }
    }
}

/// Decide/evolve split of an event-sourced aggregate.
///
/// `handle` inspects state and returns the events a command produces, without
/// touching state. `apply` folds one event in and bumps the version. Neither may
/// perform IO.
pub trait Aggregate: AggregateRoot {
    type Command: Clone + core::fmt::Debug;
    type Event: Clone + core::fmt::Debug;
    type Error: core::fmt::Debug;

    fn apply(&mut self, event: &Self::Event);

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    /// Fold a recorded stream into `self`.
    fn replay<'a, I>(mut self, events: I) -> Self
    where
        Self: Sized,
        Self::Event: 'a,
        I: IntoIterator<Item = &'a Self::Event>,
    {
        for event in events {
            self.apply(event);
        }
        self
    }
}
