//! Session wiring: one engine environment plus one bridge.

use std::sync::Arc;

use crate::bridge::{Bridge, ExecutorConfig};
use crate::dom::HtmlDocument;
use crate::engine::{EngineConfig, EngineEnvironment};
use crate::snapshot::ContentSnapshot;

/// An editable page and the bridge into it.
pub struct EditorSession {
    engine: Arc<EngineEnvironment>,
    bridge: Arc<Bridge>,
}

impl EditorSession {
    pub fn open(html: &str) -> Self {
        Self::open_with(html, ExecutorConfig::default())
    }

    pub fn open_with(html: &str, config: ExecutorConfig) -> Self {
        let engine = EngineEnvironment::start(EngineConfig::new().with_html(html));
        let bridge = Arc::new(Bridge::new(Arc::clone(&engine), config));
        Self { engine, bridge }
    }

    pub fn document(&self) -> HtmlDocument {
        HtmlDocument::new(Arc::clone(&self.bridge))
    }

    pub fn bridge(&self) -> &Arc<Bridge> {
        &self.bridge
    }

    pub fn engine(&self) -> &Arc<EngineEnvironment> {
        &self.engine
    }

    /// Latest pushed editor state; never blocks on the bridge.
    pub fn snapshot(&self) -> ContentSnapshot {
        self.bridge.snapshot()
    }

    /// Tear the engine down, joining its worker thread.
    pub fn shutdown(self) {
        self.engine.shutdown();
    }
}
