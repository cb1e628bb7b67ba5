// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Windows spooler backend: drives the PrintManagement cmdlets through
// `powershell.exe`.
//
// Printer names and paths are handed to the scripts through environment
// variables, never spliced into the script text. Status is read as the raw
// spooler status word and decoded with `PrinterStatus::from_spooler_flags`.
// Submission uses the shell "PrintTo" verb, so the application registered
// for PDFs renders the document.

use std::path::Path;
use std::process::Command;

use tracing::{debug, info, warn};

use autoprint_core::error::{AutoprintError, Result};
use autoprint_core::types::PrinterStatus;

use super::PrintBackend;

const PRINTER_VAR: &str = "AUTOPRINT_PRINTER";
const PATH_VAR: &str = "AUTOPRINT_PATH";

const LIST_SCRIPT: &str = "Get-Printer | ForEach-Object { $_.Name }";

const DEFAULT_SCRIPT: &str =
    "Get-CimInstance -ClassName Win32_Printer -Filter 'Default=TRUE' | ForEach-Object { $_.Name }";

const STATUS_SCRIPT: &str = "[uint32](Get-Printer -Name $env:AUTOPRINT_PRINTER).PrinterStatus";

const SUBMIT_SCRIPT: &str = "Start-Process -FilePath $env:AUTOPRINT_PATH -Verb PrintTo \
     -ArgumentList ('\"' + $env:AUTOPRINT_PRINTER + '\"') -WindowStyle Hidden";

/// Print backend for the Windows print spooler.
#[derive(Debug, Clone)]
pub struct WindowsSpoolerBackend {
    shell: String,
}

impl Default for WindowsSpoolerBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowsSpoolerBackend {
    pub fn new() -> Self {
        Self {
            shell: "powershell.exe".into(),
        }
    }

    /// Run `script` and return its stdout, or a description of why it failed.
    fn run(&self, script: &str, vars: &[(&str, &str)]) -> std::result::Result<String, String> {
        debug!(script, "running spooler script");
        let script = format!("$ErrorActionPreference = 'Stop'; {script}");
        let output = Command::new(&self.shell)
            .args(["-NoProfile", "-NonInteractive", "-Command", &script])
            .envs(vars.iter().copied())
            .output()
            .map_err(|e| format!("cannot run {}: {e}", self.shell))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(format!(
                "{} exited with {}: {}",
                self.shell,
                output.status,
                stderr.trim()
            ))
        }
    }
}

impl PrintBackend for WindowsSpoolerBackend {
    fn name(&self) -> &str {
        "windows-spooler"
    }

    fn enumerate_printers(&self) -> Result<Vec<String>> {
        let stdout = self
            .run(LIST_SCRIPT, &[])
            .map_err(AutoprintError::PrinterEnumeration)?;
        Ok(parse_printer_names(&stdout))
    }

    fn default_printer(&self) -> Result<Option<String>> {
        let stdout = self
            .run(DEFAULT_SCRIPT, &[])
            .map_err(AutoprintError::PrinterEnumeration)?;
        Ok(parse_printer_names(&stdout).into_iter().next())
    }

    fn query_status(&self, printer: &str) -> Result<PrinterStatus> {
        let reply = self
            .run(STATUS_SCRIPT, &[(PRINTER_VAR, printer)])
            .and_then(|stdout| {
                parse_status_word(&stdout).ok_or_else(|| format!("unexpected status reply: {stdout:?}"))
            });

        match reply {
            Ok(flags) => {
                debug!(printer, flags = %format!("{flags:#x}"), "spooler status");
                Ok(PrinterStatus::from_spooler_flags(flags))
            }
            Err(detail) => {
                warn!(printer, %detail, "could not query printer status");
                Err(AutoprintError::PrinterOffline {
                    printer: printer.to_string(),
                    reason: detail,
                })
            }
        }
    }

    fn submit(&self, path: &Path, printer: &str) -> Result<()> {
        let path_str = path.to_str().ok_or_else(|| {
            AutoprintError::Dispatch(format!("path is not valid UTF-8: {}", path.display()))
        })?;

        self.run(SUBMIT_SCRIPT, &[(PATH_VAR, path_str), (PRINTER_VAR, printer)])
            .map_err(AutoprintError::Dispatch)?;

        info!(printer, "spooler accepted job");
        Ok(())
    }
}

/// One printer name per line.
pub fn parse_printer_names(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// The spooler status word, printed as a decimal integer.
pub fn parse_status_word(stdout: &str) -> Option<u32> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_one_per_line() {
        let printers = parse_printer_names("Office\r\nMicrosoft Print to PDF\r\n\r\n  Label  \r\n");
        assert_eq!(printers, vec!["Office", "Microsoft Print to PDF", "Label"]);
        assert!(parse_printer_names("\r\n").is_empty());
    }

    #[test]
    fn idle_status_word_is_ready() {
        let flags = parse_status_word("0\r\n").expect("status");
        assert!(PrinterStatus::from_spooler_flags(flags).is_ready());
    }

    #[test]
    fn offline_status_word_is_decoded() {
        let flags = parse_status_word("128\r\n").expect("status");
        let status = PrinterStatus::from_spooler_flags(flags);
        assert!(status.offline);
        assert!(!status.is_ready());
    }

    #[test]
    fn garbage_status_reply_is_rejected() {
        assert_eq!(parse_status_word("Normal"), None);
        assert_eq!(parse_status_word(""), None);
    }

    #[test]
    fn missing_shell_maps_to_backend_errors() {
        let backend = WindowsSpoolerBackend {
            shell: "/nonexistent/autoprint-powershell".into(),
        };
        assert!(matches!(
            backend.enumerate_printers(),
            Err(AutoprintError::PrinterEnumeration(_))
        ));
        assert!(matches!(
            backend.query_status("Office"),
            Err(AutoprintError::PrinterOffline { .. })
        ));
        assert!(matches!(
            backend.submit(Path::new("C:\\in\\report.pdf"), "Office"),
            Err(AutoprintError::Dispatch(_))
        ));
    }
}
