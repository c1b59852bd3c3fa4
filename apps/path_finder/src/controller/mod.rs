//! Controller layer: events, the endpoint/route reducer, and command orchestration.

pub mod events;
pub mod orchestration;
pub mod reducer;
