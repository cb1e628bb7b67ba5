// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// autoprint-print: print backends, printer resolution and job dispatch.
// This crate bridges between the core domain types defined in
// `autoprint-core` and the OS print subsystem.

pub mod backend;
pub mod dispatcher;
pub mod resolver;
pub mod retry;

pub use backend::{PrintBackend, system_backend};
pub use dispatcher::Dispatcher;
pub use resolver::PrinterResolver;
