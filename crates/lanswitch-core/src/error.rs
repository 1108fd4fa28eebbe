// ── Core error types ──
//
// Errors raised by dataplane collaborators and tunnel artifact handling.
// Lifecycle calls (`start`, `stop`) never return these: they log and move
// on. Only single-tunnel operations propagate them to the caller.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Configuration errors ─────────────────────────────────────────
    #[error("Invalid output specification '{spec}': {reason}")]
    InvalidOutput { spec: String, reason: String },

    #[error("Tunnel name '{name}' is already used by another tunnel")]
    TunnelConflict { name: String },

    // ── OS resource errors ───────────────────────────────────────────
    #[error("Link not found: {name}")]
    LinkNotFound { name: String },

    #[error("Command `{program} {args}` failed ({status}): {output}")]
    Command {
        program: String,
        args: String,
        status: String,
        output: String,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
