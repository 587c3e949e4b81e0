//! A synchronous HTML document object model over an asynchronous engine.
//!
//! The engine underneath exposes two primitives: evaluate a script
//! asynchronously, and push one-way messages. This crate makes that look,
//! to calling code, like a synchronous, identity-stable document object
//! graph: stateless wrapper types translate legacy property access into
//! blocking bridge calls keyed by opaque node handles, while a push channel
//! keeps a snapshot cache fresh so hot-path reads never block.

pub mod bridge;
pub mod commands;
pub mod dom;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod session;
pub mod snapshot;

pub use bridge::{Bridge, ExecutorConfig, SyncExecutor};
pub use commands::CommandSet;
pub use dom::{Element, ElementCollection, HtmlDocument, Selection, Style, TextRange};
pub use error::BridgeError;
pub use session::EditorSession;
pub use snapshot::ContentSnapshot;
