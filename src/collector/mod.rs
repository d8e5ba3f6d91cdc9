//! Collection module
//!
//! The per-query collection loop, its state machine, the multi-query
//! driver, and the clock used for pacing.

mod clock;
mod driver;
mod executor;
mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use clock::{Clock, ManualClock, TokioClock};
pub use driver::{Harvest, HarvestResult, QueryOutcome, QueryReport};
pub use executor::{CollectOptions, Collector};
pub use state::{CollectState, Event, Progress};
