// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for swid crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`tags`] - canonical fixture tags covering every part of the model
//! - [`io`] - a writer that fails on demand
//! - [`logging`] - tracing subscriber setup for tests

pub mod io;
pub mod logging;
pub mod tags;

pub use io::FailingWriter;
pub use logging::init_test_tracing;
pub use tags::{
    creator, evidence_tag, fixture_date, full_payload_tag, minimal_tag, private_terms_tag,
    private_vocabularies, ABC_SHA256, CREATOR, CREATOR_REGID, FIXTURE_EPOCH,
};
