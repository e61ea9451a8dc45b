//! Holding timelines - quantity as a piecewise-constant function of time.

mod holding_timeline;

#[cfg(test)]
mod holding_timeline_tests;

pub use holding_timeline::{Breakpoint, HoldingTimeline};
