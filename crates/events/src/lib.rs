//! Session events: the event trait, the envelope they travel in, and the
//! projection/execution helpers built on top of them.

pub mod envelope;
pub mod event;
pub mod handler;
pub mod projection;

pub use envelope::EventEnvelope;
pub use event::Event;
pub use handler::execute;
pub use projection::Projection;
