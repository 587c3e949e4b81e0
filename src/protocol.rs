//! Wire shapes crossing the engine boundary.
//!
//! The engine exposes exactly two primitives: asynchronous evaluation of a
//! script, and one-way message delivery. A "script" here is a JSON-encoded
//! [`ScriptRequest`]; the evaluation result is a JSON-encoded value, so
//! string results arrive quoted and escaped and must be decoded before use.
//! Push messages are JSON objects tagged with a `type` field.

use serde::{Deserialize, Serialize};

/// Movement/expansion unit for text ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveUnit {
    Character,
    Word,
    Sentence,
}

/// Four-way endpoint selector used by `set_end_point`/`compare_end_points`.
///
/// The first word names the endpoint of the range the call is made on, the
/// second the endpoint of the other range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndPointComparison {
    StartToStart,
    StartToEnd,
    EndToStart,
    EndToEnd,
}

/// Formatting primitives understood natively by the engine.
///
/// Legacy command identifier strings are mapped onto these by the host-side
/// command layer; anything it cannot map is reported unsupported without ever
/// reaching the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NativeCommand {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    UnorderedList,
    OrderedList,
    CreateLink,
    Unlink,
    RemoveFormat,
    JustifyLeft,
    JustifyCenter,
    JustifyRight,
    Indent,
    Outdent,
}

/// Synthetic geometry for an element.
///
/// Derived from a simple text-flow model (fixed line height and column
/// width), not from real layout. Scroll offsets are tracked per element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementMetrics {
    pub offset_left: i64,
    pub offset_top: i64,
    pub offset_width: i64,
    pub offset_height: i64,
    pub scroll_left: i64,
    pub scroll_top: i64,
    pub scroll_width: i64,
    pub scroll_height: i64,
}

/// One evaluation request. Serialized as the "script" handed to the engine.
///
/// Node-addressed operations take an opaque node handle minted by the engine's
/// identity registry; range operations take a range handle keyed into the
/// engine-side range table. A handle that no longer resolves yields a null
/// reply rather than a fault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptRequest {
    // Document surface
    DocumentBody,
    DocumentHtml,
    LoadHtml { html: String },
    InsertText { text: String },

    // Element content
    InnerHtml { handle: String },
    SetInnerHtml { handle: String, value: String },
    OuterHtml { handle: String },
    SetOuterHtml { handle: String, value: String },
    InnerText { handle: String },
    SetInnerText { handle: String, value: String },

    // Element structure
    TagName { handle: String },
    Parent { handle: String },
    Children { handle: String },
    Attribute { handle: String, name: String },
    SetAttribute { handle: String, name: String, value: String },
    RemoveAttribute { handle: String, name: String },
    Contains { handle: String, other: String },
    ElementsByTag { root: Option<String>, tag: String },
    ElementsByName { root: Option<String>, name: String },
    StripIdentity { handle: String },

    // Geometry and interaction state
    Metrics { handle: String },
    SetScroll { handle: String, left: i64, top: i64 },
    Focus { handle: String },
    Blur { handle: String },
    Click { handle: String },
    ScrollIntoView { handle: String },

    // Inline style
    StyleText { handle: String },
    SetStyleText { handle: String, value: String },
    StyleProperty { handle: String, name: String },
    SetStyleProperty { handle: String, name: String, value: String },

    // Formatting commands
    ExecCommand {
        command: NativeCommand,
        value: Option<String>,
    },
    QueryState { command: NativeCommand },
    QueryValue { command: NativeCommand },
    QueryEnabled { command: NativeCommand },

    // Ranges
    CreateRange,
    SelectionRange,
    RangeCollapse { handle: String, to_start: bool },
    RangeDuplicate { handle: String },
    RangeIsEqual { handle: String, other: String },
    RangeMove {
        handle: String,
        unit: MoveUnit,
        count: i64,
    },
    RangeMoveStart {
        handle: String,
        unit: MoveUnit,
        count: i64,
    },
    RangeMoveEnd {
        handle: String,
        unit: MoveUnit,
        count: i64,
    },
    RangeExpand { handle: String, unit: MoveUnit },
    RangeSetEndPoint {
        handle: String,
        how: EndPointComparison,
        other: String,
    },
    RangeCompareEndPoints {
        handle: String,
        how: EndPointComparison,
        other: String,
    },
    RangeText { handle: String },
    RangeHtml { handle: String },
    RangePasteHtml { handle: String, html: String },
    RangeSelect { handle: String },
    RangeBookmark { handle: String },
    RangeMoveToBookmark { handle: String, bookmark: String },
    RangeDispose { handle: String },

    /// Hold the worker for the given duration before replying. Stands in for
    /// a slow evaluation when exercising bounded waits.
    Sleep { ms: u64 },
}

/// One-way message pushed from the engine to the host.
///
/// Delivery preserves arrival order; the host caches the latest state and
/// serves all hot-path reads from that cache without a bridge round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushPayload {
    ContentChanged {
        html: String,
        text: String,
    },
    SelectionChanged {
        text: String,
        block: Option<String>,
    },
    LinkContext {
        href: Option<String>,
        text: Option<String>,
    },
}
