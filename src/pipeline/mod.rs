//! Triage pipeline.
//!
//! Every raw support message flows through:
//! 1. `rules::categorise()` — ordered keyword/phrase groups → `Category`
//! 2. `rules::prioritise()` — ordered signal phrases → `Priority`
//! 3. `processor::triage()` — assembles the `TriagedMessage`, unresolved
//!
//! Classification is a pure function of the message body. Nothing here
//! performs I/O or holds state between calls.

pub mod matcher;
pub mod processor;
pub mod rules;
pub mod types;
