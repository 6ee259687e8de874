//! Replay engine and its seams.
//!
//! The engine drives one request descriptor through an unbounded
//! send → classify → delay loop. Transport, delay and error policy are traits
//! so the loop can be exercised without sockets or real sleeping.

mod classify;
mod engine;
mod error;
mod outcome;
mod sleeper;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use classify::{
    policy_for, AlwaysRetry, ErrorPolicy, FailOnPermanent, MarkerPolicy, SuccessPolicy,
};
pub use engine::{EngineReport, ReplayEngine};
pub use error::{AttemptError, ReplayError};
pub use outcome::Outcome;
pub use sleeper::{Sleeper, TokioSleeper};
pub use transport::{CurlTransport, HttpResponse, PreparedRequest, Transport, FORM_CONTENT_TYPE};
