use std::sync::Arc;

use crate::bridge::Bridge;
use crate::error::BridgeError;

use super::Element;

/// Ordered list of element handles.
///
/// The handle list is fetched in a single call when the collection is built;
/// individual elements materialize lazily on indexing or iteration.
pub struct ElementCollection {
    bridge: Arc<Bridge>,
    handles: Vec<String>,
}

impl ElementCollection {
    pub(crate) fn new(bridge: Arc<Bridge>, handles: Vec<String>) -> Self {
        Self { bridge, handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn handles(&self) -> &[String] {
        &self.handles
    }

    pub fn item(&self, index: usize) -> Option<Element> {
        self.handles
            .get(index)
            .map(|handle| Element::new(Arc::clone(&self.bridge), handle.clone()))
    }

    pub fn iter(&self) -> impl Iterator<Item = Element> + '_ {
        self.handles
            .iter()
            .map(|handle| Element::new(Arc::clone(&self.bridge), handle.clone()))
    }

    /// First member whose `id` or `name` attribute matches.
    pub fn named(&self, name: &str) -> Result<Option<Element>, BridgeError> {
        for element in self.iter() {
            if element.attribute("id")?.as_deref() == Some(name)
                || element.attribute("name")?.as_deref() == Some(name)
            {
                return Ok(Some(element));
            }
        }
        Ok(None)
    }
}
