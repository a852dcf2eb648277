/// Execute an aggregate command deterministically (no IO, no async).
///
/// 1. **Decide**: `aggregate.handle(command)` produces events without mutating.
/// 2. **Evolve**: each event is applied to the aggregate in order.
///
/// The decided events are returned so callers can persist or publish them.
pub fn execute<A>(aggregate: &mut A, command: &A::Command) -> Result<Vec<A::Event>, A::Error>
where
    A: aptitude_core::Aggregate,
{
    let events = A::handle(aggregate, command)?;
    for ev in &events {
        aggregate.apply(ev);
    }
    Ok(events)
}
