use std::sync::Arc;

use crate::bridge::Bridge;
use crate::error::BridgeError;
use crate::protocol::ScriptRequest;

use super::TextRange;

/// The live selection. Holds no state of its own; every accessor derives a
/// fresh range from the engine.
pub struct Selection {
    bridge: Arc<Bridge>,
}

impl Selection {
    pub(crate) fn new(bridge: Arc<Bridge>) -> Self {
        Self { bridge }
    }

    /// Range over the current selection (collapsed at the caret when nothing
    /// is selected).
    pub fn range(&self) -> Result<Option<TextRange>, BridgeError> {
        Ok(self
            .bridge
            .call_string(&ScriptRequest::SelectionRange)?
            .map(|handle| TextRange::new(Arc::clone(&self.bridge), handle)))
    }

    /// Selected text, via a throwaway range.
    pub fn text(&self) -> Result<Option<String>, BridgeError> {
        let Some(range) = self.range()? else {
            return Ok(None);
        };
        let text = range.text()?;
        range.dispose()?;
        Ok(text)
    }
}
