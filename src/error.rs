use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the synchronous executor and the typed call helpers
/// built on top of it.
///
/// Stale handles are deliberately NOT represented here: an operation against
/// a handle that no longer resolves to a live node yields a null/empty reply,
/// so callers null-check instead of catching.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The engine raised while evaluating the script, or reported malformed
    /// input. Carries the engine's own message.
    #[error("script fault: {0}")]
    ScriptFault(String),

    /// A call was issued while another call on the same executor was still
    /// pending. Calls are never interleaved.
    #[error("bridge call already in flight")]
    CallInFlight,

    /// The bounded wait expired. The underlying evaluation is abandoned, not
    /// cancelled; its eventual result is discarded.
    #[error("bridge call abandoned after {0:?}")]
    Timeout(Duration),

    /// The engine worker is gone (shut down or panicked).
    #[error("engine connection closed")]
    Disconnected,

    /// The engine resolved the call but the reply was not decodable JSON.
    #[error("malformed engine reply: {0}")]
    MalformedReply(String),
}

/// Faults raised inside the engine worker while evaluating a script.
#[derive(Debug, Error)]
pub enum EngineFault {
    #[error("malformed script: {0}")]
    MalformedScript(String),

    #[error("engine failure: {0}")]
    Internal(String),
}
