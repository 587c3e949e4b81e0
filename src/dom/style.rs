use std::sync::Arc;

use crate::bridge::Bridge;
use crate::error::BridgeError;
use crate::protocol::ScriptRequest;

/// Inline style of one element, backed by its `style` attribute.
pub struct Style {
    bridge: Arc<Bridge>,
    handle: String,
}

impl Style {
    pub(crate) fn new(bridge: Arc<Bridge>, handle: String) -> Self {
        Self { bridge, handle }
    }

    pub fn css_text(&self) -> Result<Option<String>, BridgeError> {
        self.bridge.call_string(&ScriptRequest::StyleText {
            handle: self.handle.clone(),
        })
    }

    pub fn set_css_text(&self, value: &str) -> Result<(), BridgeError> {
        self.bridge.call_unit(&ScriptRequest::SetStyleText {
            handle: self.handle.clone(),
            value: value.to_string(),
        })
    }

    pub fn property(&self, name: &str) -> Result<Option<String>, BridgeError> {
        self.bridge.call_string(&ScriptRequest::StyleProperty {
            handle: self.handle.clone(),
            name: name.to_string(),
        })
    }

    pub fn set_property(&self, name: &str, value: &str) -> Result<(), BridgeError> {
        self.bridge.call_unit(&ScriptRequest::SetStyleProperty {
            handle: self.handle.clone(),
            name: name.to_string(),
            value: value.to_string(),
        })
    }
}
