use std::sync::Arc;

use crate::bridge::Bridge;
use crate::commands::CommandSet;
use crate::error::BridgeError;
use crate::protocol::ScriptRequest;
use crate::snapshot::ContentSnapshot;

use super::{Element, ElementCollection, Selection, TextRange};

/// The document surface: entry point into the object model.
pub struct HtmlDocument {
    bridge: Arc<Bridge>,
}

impl HtmlDocument {
    pub fn new(bridge: Arc<Bridge>) -> Self {
        Self { bridge }
    }

    pub fn bridge(&self) -> &Arc<Bridge> {
        &self.bridge
    }

    pub fn body(&self) -> Result<Option<Element>, BridgeError> {
        Ok(self
            .bridge
            .call_string(&ScriptRequest::DocumentBody)?
            .map(|handle| Element::new(Arc::clone(&self.bridge), handle)))
    }

    /// Serialized document, doctype included.
    pub fn html(&self) -> Result<String, BridgeError> {
        Ok(self
            .bridge
            .call_string(&ScriptRequest::DocumentHtml)?
            .unwrap_or_default())
    }

    /// Replace the page. Every outstanding node and range handle becomes
    /// stale; this is also the closest thing to cancelling in-flight work.
    pub fn load_html(&self, html: &str) -> Result<(), BridgeError> {
        self.bridge.call_unit(&ScriptRequest::LoadHtml {
            html: html.to_string(),
        })
    }

    /// Insert text at the caret, replacing the selection. This is the typing path.
    pub fn insert_text(&self, text: &str) -> Result<(), BridgeError> {
        self.bridge.call_unit(&ScriptRequest::InsertText {
            text: text.to_string(),
        })
    }

    /// Rebuild an element view from a previously obtained handle. Wrappers
    /// hold no state, so this is always safe; a stale handle just reads back
    /// as empty.
    pub fn element_from_handle(&self, handle: &str) -> Element {
        Element::new(Arc::clone(&self.bridge), handle.to_string())
    }

    pub fn selection(&self) -> Selection {
        Selection::new(Arc::clone(&self.bridge))
    }

    /// Fresh range collapsed at the start of the document flow.
    pub fn create_range(&self) -> Result<TextRange, BridgeError> {
        let handle = self
            .bridge
            .call_string(&ScriptRequest::CreateRange)?
            .ok_or_else(|| BridgeError::MalformedReply("missing range handle".to_string()))?;
        Ok(TextRange::new(Arc::clone(&self.bridge), handle))
    }

    pub fn elements_by_tag(&self, tag: &str) -> Result<ElementCollection, BridgeError> {
        let handles = self.bridge.call_list(&ScriptRequest::ElementsByTag {
            root: None,
            tag: tag.to_string(),
        })?;
        Ok(ElementCollection::new(Arc::clone(&self.bridge), handles))
    }

    pub fn elements_by_name(&self, name: &str) -> Result<ElementCollection, BridgeError> {
        let handles = self.bridge.call_list(&ScriptRequest::ElementsByName {
            root: None,
            name: name.to_string(),
        })?;
        Ok(ElementCollection::new(Arc::clone(&self.bridge), handles))
    }

    pub fn commands(&self) -> CommandSet {
        CommandSet::new(Arc::clone(&self.bridge))
    }

    /// Latest pushed editor state; never issues a bridge call.
    pub fn snapshot(&self) -> ContentSnapshot {
        self.bridge.snapshot()
    }
}
