// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// autoprint-watch: turns raw filesystem notifications into print jobs.
//
// Watch source → event filter → debouncer → readiness validator → dispatcher.

pub mod debounce;
pub mod filter;
pub mod pipeline;
pub mod readiness;
pub mod source;

pub use debounce::Debouncer;
pub use filter::EventFilter;
pub use pipeline::{EventOutcome, Pipeline, PipelineStats};
pub use readiness::{ReadinessValidator, ReadyDocument};
pub use source::WatchSource;
