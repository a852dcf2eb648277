//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity: a difficulty level of 3 is the same as any other
/// difficulty level of 3. They are immutable; "changing" one means producing a new
/// value (see `DifficultyLevel::step_up`).
///
/// The trait requires:
/// - **Clone**: value objects are cheap to copy
/// - **PartialEq**: value objects are compared by their attribute values
/// - **Debug**: value objects show up in logs and test failures
///
/// ```ignore
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// struct DifficultyLevel(u8);
///
/// impl ValueObject for DifficultyLevel {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
