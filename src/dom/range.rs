use std::sync::Arc;

use crate::bridge::Bridge;
use crate::error::BridgeError;
use crate::protocol::{EndPointComparison, MoveUnit, ScriptRequest};

/// A span of the editable text flow, addressed by a range handle.
///
/// Range handles key into an engine-side table and live until explicitly
/// disposed; dropping this wrapper does not release the engine entry.
pub struct TextRange {
    bridge: Arc<Bridge>,
    handle: String,
}

impl TextRange {
    pub(crate) fn new(bridge: Arc<Bridge>, handle: String) -> Self {
        Self { bridge, handle }
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// Collapse to the start (`true`) or end (`false`) boundary.
    pub fn collapse(&self, to_start: bool) -> Result<(), BridgeError> {
        self.bridge.call_unit(&ScriptRequest::RangeCollapse {
            handle: self.handle.clone(),
            to_start,
        })
    }

    /// Independent copy with equal bounds. `None` when this handle is gone.
    pub fn duplicate(&self) -> Result<Option<TextRange>, BridgeError> {
        Ok(self
            .bridge
            .call_string(&ScriptRequest::RangeDuplicate {
                handle: self.handle.clone(),
            })?
            .map(|handle| TextRange::new(Arc::clone(&self.bridge), handle)))
    }

    pub fn is_equal(&self, other: &TextRange) -> Result<bool, BridgeError> {
        self.bridge.call_bool(&ScriptRequest::RangeIsEqual {
            handle: self.handle.clone(),
            other: other.handle.clone(),
        })
    }

    /// Collapse and move by `count` units; returns the signed number of
    /// units actually moved.
    pub fn move_by(&self, unit: MoveUnit, count: i64) -> Result<i64, BridgeError> {
        self.bridge.call_i64(&ScriptRequest::RangeMove {
            handle: self.handle.clone(),
            unit,
            count,
        })
    }

    pub fn move_start(&self, unit: MoveUnit, count: i64) -> Result<i64, BridgeError> {
        self.bridge.call_i64(&ScriptRequest::RangeMoveStart {
            handle: self.handle.clone(),
            unit,
            count,
        })
    }

    pub fn move_end(&self, unit: MoveUnit, count: i64) -> Result<i64, BridgeError> {
        self.bridge.call_i64(&ScriptRequest::RangeMoveEnd {
            handle: self.handle.clone(),
            unit,
            count,
        })
    }

    /// Grow to the enclosing unit; returns whether the bounds changed.
    pub fn expand(&self, unit: MoveUnit) -> Result<bool, BridgeError> {
        self.bridge.call_bool(&ScriptRequest::RangeExpand {
            handle: self.handle.clone(),
            unit,
        })
    }

    pub fn set_end_point(
        &self,
        how: EndPointComparison,
        other: &TextRange,
    ) -> Result<(), BridgeError> {
        self.bridge.call_unit(&ScriptRequest::RangeSetEndPoint {
            handle: self.handle.clone(),
            how,
            other: other.handle.clone(),
        })
    }

    /// Native boundary-point comparison: -1, 0 or 1.
    pub fn compare_end_points(
        &self,
        how: EndPointComparison,
        other: &TextRange,
    ) -> Result<i32, BridgeError> {
        Ok(self.bridge.call_i64(&ScriptRequest::RangeCompareEndPoints {
            handle: self.handle.clone(),
            how,
            other: other.handle.clone(),
        })? as i32)
    }

    pub fn text(&self) -> Result<Option<String>, BridgeError> {
        self.bridge.call_string(&ScriptRequest::RangeText {
            handle: self.handle.clone(),
        })
    }

    pub fn html_text(&self) -> Result<Option<String>, BridgeError> {
        self.bridge.call_string(&ScriptRequest::RangeHtml {
            handle: self.handle.clone(),
        })
    }

    /// Replace the covered span with parsed HTML; the range collapses after
    /// the inserted content.
    pub fn paste_html(&self, html: &str) -> Result<(), BridgeError> {
        self.bridge.call_unit(&ScriptRequest::RangePasteHtml {
            handle: self.handle.clone(),
            html: html.to_string(),
        })
    }

    /// Make this range the live selection.
    pub fn select(&self) -> Result<(), BridgeError> {
        self.bridge.call_unit(&ScriptRequest::RangeSelect {
            handle: self.handle.clone(),
        })
    }

    /// Opaque serialized position that survives handle-invalidating edits.
    pub fn bookmark(&self) -> Result<Option<String>, BridgeError> {
        self.bridge.call_string(&ScriptRequest::RangeBookmark {
            handle: self.handle.clone(),
        })
    }

    pub fn move_to_bookmark(&self, bookmark: &str) -> Result<bool, BridgeError> {
        self.bridge.call_bool(&ScriptRequest::RangeMoveToBookmark {
            handle: self.handle.clone(),
            bookmark: bookmark.to_string(),
        })
    }

    /// Release the engine-side entry. Ranges are not reclaimed implicitly.
    pub fn dispose(self) -> Result<(), BridgeError> {
        self.bridge.call_unit(&ScriptRequest::RangeDispose {
            handle: self.handle.clone(),
        })
    }
}
