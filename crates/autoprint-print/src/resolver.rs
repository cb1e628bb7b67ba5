// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer resolution: turn a configured name (or "use the default") into a
// concrete printer, once, at startup.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use autoprint_core::error::{AutoprintError, Result};
use autoprint_core::types::PrinterTarget;

use crate::backend::PrintBackend;

/// Resolves printer names against the print subsystem.
pub struct PrinterResolver {
    backend: Arc<dyn PrintBackend>,
}

impl PrinterResolver {
    pub fn new(backend: Arc<dyn PrintBackend>) -> Self {
        Self { backend }
    }

    /// Resolve the configured printer.
    ///
    /// `None` selects the system default. A name must match an enumerated
    /// printer exactly (case-sensitive). Enumeration failures propagate.
    #[instrument(skip(self), fields(backend = self.backend.name()))]
    pub fn resolve(&self, configured: Option<&str>) -> Result<PrinterTarget> {
        let Some(name) = configured else {
            let default = self
                .backend
                .default_printer()?
                .ok_or(AutoprintError::NoDefaultPrinter)?;
            info!(printer = %default, "using system default printer");
            return Ok(PrinterTarget {
                name: default,
                is_default: true,
            });
        };

        let printers = self.backend.enumerate_printers()?;
        let mut matched = false;
        for printer in &printers {
            let is_match = printer == name;
            debug!(printer = %printer, chosen = is_match, "found printer");
            matched |= is_match;
        }

        if !matched {
            warn!(printer = name, known = printers.len(), "could not find printer");
            return Err(AutoprintError::PrinterNotFound(name.to_string()));
        }

        info!(printer = name, "using configured printer");
        Ok(PrinterTarget {
            name: name.to_string(),
            is_default: false,
        })
    }

    /// Every known printer, with the system default flagged.
    pub fn list(&self) -> Result<Vec<PrinterTarget>> {
        let default = self.backend.default_printer()?;
        Ok(self
            .backend
            .enumerate_printers()?
            .into_iter()
            .map(|name| PrinterTarget {
                is_default: default.as_deref() == Some(name.as_str()),
                name,
            })
            .collect())
    }
}
