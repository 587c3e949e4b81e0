//! Host-side cache of engine-pushed state.
//!
//! The push channel is the only non-blocking read path: the engine pushes a
//! payload on every relevant mutation and the host treats the latest applied
//! payload as authoritative, so hot-path reads never issue a bridge call.

use serde::{Deserialize, Serialize};

use crate::protocol::PushPayload;

/// Latest pushed editor state. `revision` increments once per applied
/// payload, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentSnapshot {
    pub html: String,
    pub text: String,
    pub selection_text: String,
    pub selection_block: Option<String>,
    pub link_href: Option<String>,
    pub link_text: Option<String>,
    pub revision: u64,
}

#[derive(Default)]
pub struct SnapshotCache {
    snapshot: ContentSnapshot,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, payload: PushPayload) {
        match payload {
            PushPayload::ContentChanged { html, text } => {
                self.snapshot.html = html;
                self.snapshot.text = text;
            }
            PushPayload::SelectionChanged { text, block } => {
                self.snapshot.selection_text = text;
                self.snapshot.selection_block = block;
            }
            PushPayload::LinkContext { href, text } => {
                self.snapshot.link_href = href;
                self.snapshot.link_text = text;
            }
        }
        self.snapshot.revision += 1;
    }

    pub fn snapshot(&self) -> ContentSnapshot {
        self.snapshot.clone()
    }
}
