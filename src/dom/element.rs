use std::sync::Arc;

use crate::bridge::Bridge;
use crate::error::BridgeError;
use crate::protocol::{ElementMetrics, ScriptRequest};

use super::{ElementCollection, Style};

/// One element, addressed by its identity handle.
#[derive(Clone)]
pub struct Element {
    bridge: Arc<Bridge>,
    handle: String,
}

impl Element {
    pub(crate) fn new(bridge: Arc<Bridge>, handle: String) -> Self {
        Self { bridge, handle }
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    // ----- content --------------------------------------------------------

    pub fn inner_html(&self) -> Result<Option<String>, BridgeError> {
        self.bridge.call_string(&ScriptRequest::InnerHtml {
            handle: self.handle.clone(),
        })
    }

    pub fn set_inner_html(&self, value: &str) -> Result<(), BridgeError> {
        self.bridge.call_unit(&ScriptRequest::SetInnerHtml {
            handle: self.handle.clone(),
            value: value.to_string(),
        })
    }

    pub fn outer_html(&self) -> Result<Option<String>, BridgeError> {
        self.bridge.call_string(&ScriptRequest::OuterHtml {
            handle: self.handle.clone(),
        })
    }

    /// Replace this element with parsed markup. This handle goes stale once
    /// the call returns.
    pub fn set_outer_html(&self, value: &str) -> Result<(), BridgeError> {
        self.bridge.call_unit(&ScriptRequest::SetOuterHtml {
            handle: self.handle.clone(),
            value: value.to_string(),
        })
    }

    pub fn inner_text(&self) -> Result<Option<String>, BridgeError> {
        self.bridge.call_string(&ScriptRequest::InnerText {
            handle: self.handle.clone(),
        })
    }

    pub fn set_inner_text(&self, value: &str) -> Result<(), BridgeError> {
        self.bridge.call_unit(&ScriptRequest::SetInnerText {
            handle: self.handle.clone(),
            value: value.to_string(),
        })
    }

    // ----- structure ------------------------------------------------------

    pub fn tag_name(&self) -> Result<Option<String>, BridgeError> {
        self.bridge.call_string(&ScriptRequest::TagName {
            handle: self.handle.clone(),
        })
    }

    pub fn parent(&self) -> Result<Option<Element>, BridgeError> {
        Ok(self
            .bridge
            .call_string(&ScriptRequest::Parent {
                handle: self.handle.clone(),
            })?
            .map(|handle| Element::new(Arc::clone(&self.bridge), handle)))
    }

    pub fn children(&self) -> Result<ElementCollection, BridgeError> {
        let handles = self.bridge.call_list(&ScriptRequest::Children {
            handle: self.handle.clone(),
        })?;
        Ok(ElementCollection::new(Arc::clone(&self.bridge), handles))
    }

    pub fn attribute(&self, name: &str) -> Result<Option<String>, BridgeError> {
        self.bridge.call_string(&ScriptRequest::Attribute {
            handle: self.handle.clone(),
            name: name.to_string(),
        })
    }

    pub fn set_attribute(&self, name: &str, value: &str) -> Result<(), BridgeError> {
        self.bridge.call_unit(&ScriptRequest::SetAttribute {
            handle: self.handle.clone(),
            name: name.to_string(),
            value: value.to_string(),
        })
    }

    pub fn remove_attribute(&self, name: &str) -> Result<(), BridgeError> {
        self.bridge.call_unit(&ScriptRequest::RemoveAttribute {
            handle: self.handle.clone(),
            name: name.to_string(),
        })
    }

    pub fn contains(&self, other: &Element) -> Result<bool, BridgeError> {
        self.bridge.call_bool(&ScriptRequest::Contains {
            handle: self.handle.clone(),
            other: other.handle.clone(),
        })
    }

    /// Strip identity attributes from this subtree before handing its markup
    /// to a presentation surface. Handles into the subtree become stale.
    pub fn strip_identity_attributes(&self) -> Result<(), BridgeError> {
        self.bridge.call_unit(&ScriptRequest::StripIdentity {
            handle: self.handle.clone(),
        })
    }

    // ----- geometry and state --------------------------------------------

    pub fn metrics(&self) -> Result<ElementMetrics, BridgeError> {
        Ok(self
            .bridge
            .call_decoded(&ScriptRequest::Metrics {
                handle: self.handle.clone(),
            })?
            .unwrap_or_default())
    }

    pub fn set_scroll(&self, left: i64, top: i64) -> Result<(), BridgeError> {
        self.bridge.call_unit(&ScriptRequest::SetScroll {
            handle: self.handle.clone(),
            left,
            top,
        })
    }

    pub fn focus(&self) -> Result<(), BridgeError> {
        self.bridge.call_unit(&ScriptRequest::Focus {
            handle: self.handle.clone(),
        })
    }

    pub fn blur(&self) -> Result<(), BridgeError> {
        self.bridge.call_unit(&ScriptRequest::Blur {
            handle: self.handle.clone(),
        })
    }

    pub fn click(&self) -> Result<(), BridgeError> {
        self.bridge.call_unit(&ScriptRequest::Click {
            handle: self.handle.clone(),
        })
    }

    pub fn scroll_into_view(&self) -> Result<(), BridgeError> {
        self.bridge.call_unit(&ScriptRequest::ScrollIntoView {
            handle: self.handle.clone(),
        })
    }

    pub fn style(&self) -> Style {
        Style::new(Arc::clone(&self.bridge), self.handle.clone())
    }
}
