//! Request dispatch: the engine side of every bridge call.
//!
//! `PageEngine` owns the document tree, the identity registry, the range
//! table, and the command state. Each evaluation parses one request, mutates
//! or reads the page, and encodes the reply as a JSON value. Operations
//! against handles that no longer resolve reply with null instead of
//! faulting; only malformed scripts fault.

use std::collections::HashMap;
use std::time::Duration;

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::error::EngineFault;
use crate::protocol::{
    ElementMetrics, EndPointComparison, MoveUnit, NativeCommand, PushPayload, ScriptRequest,
};

use super::commands::CommandRegistry;
use super::document::{char_len, is_block_element, DomTree};
use super::identity::IdentityIndex;
use super::ranges::{
    self, bookmark_position, resolve_bookmark_position, EditRange, RangeBookmark, RangeTable,
};

const LINE_HEIGHT: i64 = 16;
const COLUMN_WIDTH: i64 = 8;

pub struct PageEngine {
    tree: DomTree,
    identity: IdentityIndex,
    ranges: RangeTable,
    commands: CommandRegistry,
    selection: EditRange,
    focused: Option<usize>,
    scroll: HashMap<usize, (i64, i64)>,
    events: UnboundedSender<PushPayload>,
}

impl PageEngine {
    pub fn new(html: &str, events: UnboundedSender<PushPayload>) -> Self {
        let mut engine = Self {
            tree: DomTree::from_html(html),
            identity: IdentityIndex::new(),
            ranges: RangeTable::new(),
            commands: CommandRegistry::new(),
            selection: EditRange::collapsed(0),
            focused: None,
            scroll: HashMap::new(),
            events,
        };
        engine.push_content();
        engine.push_selection();
        engine
    }

    /// Evaluate one script. The reply is the JSON encoding of the result
    /// value, so string results arrive quoted and escaped.
    pub async fn evaluate(&mut self, script: &str) -> Result<String, String> {
        let request: ScriptRequest = match serde_json::from_str(script) {
            Ok(request) => request,
            Err(err) => return Err(EngineFault::MalformedScript(err.to_string()).to_string()),
        };

        if let ScriptRequest::Sleep { ms } = request {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            return Ok("null".to_string());
        }

        let value = self.dispatch(request);
        serde_json::to_string(&value).map_err(|err| EngineFault::Internal(err.to_string()).to_string())
    }

    fn dispatch(&mut self, request: ScriptRequest) -> Value {
        match request {
            ScriptRequest::DocumentBody => match self.tree.body() {
                Some(body) => self.handle_value(body),
                None => Value::Null,
            },
            ScriptRequest::DocumentHtml => Value::String(self.tree.document_html()),
            ScriptRequest::LoadHtml { html } => self.load_html(&html),
            ScriptRequest::InsertText { text } => self.insert_text(&text),

            ScriptRequest::InnerHtml { handle } => match self.node(&handle) {
                Some(id) => Value::String(self.tree.serialize_children(id)),
                None => Value::Null,
            },
            ScriptRequest::SetInnerHtml { handle, value } => match self.node(&handle) {
                Some(id) => {
                    self.tree.set_inner_html(id, &value);
                    self.push_after_mutation(id);
                    Value::Null
                }
                None => Value::Null,
            },
            ScriptRequest::OuterHtml { handle } => match self.node(&handle) {
                Some(id) => Value::String(self.tree.serialize_node(id)),
                None => Value::Null,
            },
            ScriptRequest::SetOuterHtml { handle, value } => self.set_outer_html(&handle, &value),
            ScriptRequest::InnerText { handle } => match self.node(&handle) {
                Some(id) => Value::String(self.tree.inner_text(id)),
                None => Value::Null,
            },
            ScriptRequest::SetInnerText { handle, value } => match self.node(&handle) {
                Some(id) => {
                    self.tree.set_inner_text(id, &value);
                    self.push_after_mutation(id);
                    Value::Null
                }
                None => Value::Null,
            },

            ScriptRequest::TagName { handle } => match self.node(&handle) {
                Some(id) => match self.tree.tag_name(id) {
                    Some(name) => Value::String(name.to_ascii_uppercase()),
                    None => Value::Null,
                },
                None => Value::Null,
            },
            ScriptRequest::Parent { handle } => match self.node(&handle) {
                Some(id) => match self.tree.parent_element(id) {
                    Some(parent) => self.handle_value(parent),
                    None => Value::Null,
                },
                None => Value::Null,
            },
            ScriptRequest::Children { handle } => match self.node(&handle) {
                Some(id) => {
                    let children = self.tree.element_children(id);
                    self.handle_list(children)
                }
                None => Value::Array(Vec::new()),
            },
            ScriptRequest::Attribute { handle, name } => match self.node(&handle) {
                Some(id) => match self.tree.attr(id, &name) {
                    Some(value) => Value::String(value.to_string()),
                    None => Value::Null,
                },
                None => Value::Null,
            },
            ScriptRequest::SetAttribute {
                handle,
                name,
                value,
            } => match self.node(&handle) {
                Some(id) => {
                    self.tree.set_attr(id, &name, &value);
                    self.push_after_mutation(id);
                    Value::Null
                }
                None => Value::Null,
            },
            ScriptRequest::RemoveAttribute { handle, name } => match self.node(&handle) {
                Some(id) => {
                    self.tree.remove_attr(id, &name);
                    self.push_after_mutation(id);
                    Value::Null
                }
                None => Value::Null,
            },
            ScriptRequest::Contains { handle, other } => {
                match (self.node(&handle), self.node(&other)) {
                    (Some(ancestor), Some(descendant)) => {
                        Value::Bool(self.tree.contains(ancestor, descendant))
                    }
                    _ => Value::Bool(false),
                }
            }
            ScriptRequest::ElementsByTag { root, tag } => {
                let root_id = match root {
                    Some(handle) => match self.node(&handle) {
                        Some(id) => id,
                        None => return Value::Array(Vec::new()),
                    },
                    None => self.tree.root(),
                };
                let wanted = tag.to_ascii_lowercase();
                let found = self
                    .tree
                    .find_elements(root_id, &mut |name, _| name == wanted);
                self.handle_list(found)
            }
            ScriptRequest::ElementsByName { root, name } => {
                let root_id = match root {
                    Some(handle) => match self.node(&handle) {
                        Some(id) => id,
                        None => return Value::Array(Vec::new()),
                    },
                    None => self.tree.root(),
                };
                let found = self.tree.find_elements(root_id, &mut |_, attrs| {
                    attrs.iter().any(|attr| {
                        (attr.name == "id" || attr.name == "name") && attr.value == name
                    })
                });
                self.handle_list(found)
            }
            ScriptRequest::StripIdentity { handle } => match self.node(&handle) {
                Some(id) => {
                    self.identity.strip(&mut self.tree, id);
                    Value::Null
                }
                None => Value::Null,
            },

            ScriptRequest::Metrics { handle } => match self.node(&handle) {
                Some(id) => {
                    let metrics = self.metrics(id);
                    serde_json::to_value(metrics).unwrap_or(Value::Null)
                }
                None => Value::Null,
            },
            ScriptRequest::SetScroll { handle, left, top } => match self.node(&handle) {
                Some(id) => {
                    self.scroll.insert(id, (left, top));
                    Value::Null
                }
                None => Value::Null,
            },
            ScriptRequest::Focus { handle } => match self.node(&handle) {
                Some(id) => {
                    self.focused = Some(id);
                    Value::Null
                }
                None => Value::Null,
            },
            ScriptRequest::Blur { handle } => {
                if let Some(id) = self.node(&handle) {
                    if self.focused == Some(id) {
                        self.focused = None;
                    }
                }
                Value::Null
            }
            ScriptRequest::Click { handle } => self.click(&handle),
            ScriptRequest::ScrollIntoView { handle } => match self.node(&handle) {
                Some(id) => {
                    self.scroll_into_view(id);
                    Value::Null
                }
                None => Value::Null,
            },

            ScriptRequest::StyleText { handle } => match self.node(&handle) {
                Some(id) => Value::String(
                    self.tree.attr(id, "style").unwrap_or_default().to_string(),
                ),
                None => Value::Null,
            },
            ScriptRequest::SetStyleText { handle, value } => match self.node(&handle) {
                Some(id) => {
                    self.tree.set_attr(id, "style", &value);
                    self.push_after_mutation(id);
                    Value::Null
                }
                None => Value::Null,
            },
            ScriptRequest::StyleProperty { handle, name } => match self.node(&handle) {
                Some(id) => {
                    let style = self.tree.attr(id, "style").unwrap_or_default();
                    match style_get(style, &name) {
                        Some(value) => Value::String(value),
                        None => Value::Null,
                    }
                }
                None => Value::Null,
            },
            ScriptRequest::SetStyleProperty {
                handle,
                name,
                value,
            } => match self.node(&handle) {
                Some(id) => {
                    let style = self.tree.attr(id, "style").unwrap_or_default().to_string();
                    let rebuilt = style_set(&style, &name, &value);
                    self.tree.set_attr(id, "style", &rebuilt);
                    self.push_after_mutation(id);
                    Value::Null
                }
                None => Value::Null,
            },

            ScriptRequest::ExecCommand { command, value } => {
                Value::Bool(self.exec_command(command, value))
            }
            ScriptRequest::QueryState { command } => Value::Bool(self.commands.state(command)),
            ScriptRequest::QueryValue { command } => Value::String(self.commands.value(command)),
            ScriptRequest::QueryEnabled { command } => Value::Bool(self.commands.enabled(command)),

            ScriptRequest::CreateRange => {
                Value::String(self.ranges.create(EditRange::collapsed(0)))
            }
            ScriptRequest::SelectionRange => {
                let selection = self.clamped(self.selection);
                Value::String(self.ranges.create(selection))
            }
            ScriptRequest::RangeCollapse { handle, to_start } => {
                match self.range(&handle) {
                    Some(mut range) => {
                        if to_start {
                            range.end = range.start;
                        } else {
                            range.start = range.end;
                        }
                        self.ranges.set(&handle, range);
                        Value::Null
                    }
                    None => Value::Null,
                }
            }
            ScriptRequest::RangeDuplicate { handle } => match self.range(&handle) {
                Some(range) => Value::String(self.ranges.create(range)),
                None => Value::Null,
            },
            ScriptRequest::RangeIsEqual { handle, other } => {
                match (self.range(&handle), self.range(&other)) {
                    (Some(a), Some(b)) => Value::Bool(a == b),
                    _ => Value::Bool(false),
                }
            }
            ScriptRequest::RangeMove {
                handle,
                unit,
                count,
            } => match self.range(&handle) {
                Some(range) => {
                    let flow = self.flow();
                    let (position, moved) =
                        ranges::move_position(&flow, range.start, unit, count);
                    self.ranges.set(&handle, EditRange::collapsed(position));
                    Value::from(moved)
                }
                None => Value::Null,
            },
            ScriptRequest::RangeMoveStart {
                handle,
                unit,
                count,
            } => match self.range(&handle) {
                Some(mut range) => {
                    let flow = self.flow();
                    let (position, moved) =
                        ranges::move_position(&flow, range.start, unit, count);
                    range.start = position;
                    if range.end < range.start {
                        range.end = range.start;
                    }
                    self.ranges.set(&handle, range);
                    Value::from(moved)
                }
                None => Value::Null,
            },
            ScriptRequest::RangeMoveEnd {
                handle,
                unit,
                count,
            } => match self.range(&handle) {
                Some(mut range) => {
                    let flow = self.flow();
                    let (position, moved) = ranges::move_position(&flow, range.end, unit, count);
                    range.end = position;
                    if range.start > range.end {
                        range.start = range.end;
                    }
                    self.ranges.set(&handle, range);
                    Value::from(moved)
                }
                None => Value::Null,
            },
            ScriptRequest::RangeExpand { handle, unit } => match self.range(&handle) {
                Some(range) => {
                    let flow = self.flow();
                    match ranges::expand_range(&flow, range, unit) {
                        Some(expanded) => {
                            let changed = expanded != range;
                            self.ranges.set(&handle, expanded);
                            Value::Bool(changed)
                        }
                        None => Value::Bool(false),
                    }
                }
                None => Value::Null,
            },
            ScriptRequest::RangeSetEndPoint {
                handle,
                how,
                other,
            } => match (self.range(&handle), self.range(&other)) {
                (Some(mut range), Some(other_range)) => {
                    let (own_is_start, other_is_start) = endpoint_selector(how);
                    let source = if other_is_start {
                        other_range.start
                    } else {
                        other_range.end
                    };
                    if own_is_start {
                        range.start = source;
                        if range.end < range.start {
                            range.end = range.start;
                        }
                    } else {
                        range.end = source;
                        if range.start > range.end {
                            range.start = range.end;
                        }
                    }
                    self.ranges.set(&handle, range);
                    Value::Null
                }
                _ => Value::Null,
            },
            ScriptRequest::RangeCompareEndPoints {
                handle,
                how,
                other,
            } => match (self.range(&handle), self.range(&other)) {
                (Some(range), Some(other_range)) => {
                    let (own_is_start, other_is_start) = endpoint_selector(how);
                    let own = if own_is_start { range.start } else { range.end };
                    let their = if other_is_start {
                        other_range.start
                    } else {
                        other_range.end
                    };
                    Value::from(match own.cmp(&their) {
                        std::cmp::Ordering::Less => -1,
                        std::cmp::Ordering::Equal => 0,
                        std::cmp::Ordering::Greater => 1,
                    })
                }
                _ => Value::Null,
            },
            ScriptRequest::RangeText { handle } => match self.range(&handle) {
                Some(range) => Value::String(self.covered_text(range)),
                None => Value::Null,
            },
            ScriptRequest::RangeHtml { handle } => match self.range(&handle) {
                Some(range) => {
                    let text = self.covered_text(range);
                    Value::String(encode_text(&text).into_owned())
                }
                None => Value::Null,
            },
            ScriptRequest::RangePasteHtml { handle, html } => self.range_paste_html(&handle, &html),
            ScriptRequest::RangeSelect { handle } => match self.range(&handle) {
                Some(range) => {
                    self.selection = range;
                    self.push_selection();
                    Value::Null
                }
                None => Value::Null,
            },
            ScriptRequest::RangeBookmark { handle } => match self.range(&handle) {
                Some(range) => match self.tree.body() {
                    Some(body) => {
                        let bookmark = RangeBookmark {
                            start: bookmark_position(&self.tree, body, range.start),
                            end: bookmark_position(&self.tree, body, range.end),
                        };
                        match serde_json::to_string(&bookmark) {
                            Ok(encoded) => Value::String(encoded),
                            Err(_) => Value::Null,
                        }
                    }
                    None => Value::Null,
                },
                None => Value::Null,
            },
            ScriptRequest::RangeMoveToBookmark { handle, bookmark } => {
                if self.range(&handle).is_none() {
                    return Value::Null;
                }
                let Some(body) = self.tree.body() else {
                    return Value::Bool(false);
                };
                let parsed: RangeBookmark = match serde_json::from_str(&bookmark) {
                    Ok(parsed) => parsed,
                    Err(_) => return Value::Bool(false),
                };
                let start = resolve_bookmark_position(&self.tree, body, &parsed.start);
                let end = resolve_bookmark_position(&self.tree, body, &parsed.end);
                match (start, end) {
                    (Some(start), Some(end)) => {
                        let len = self.tree.flow_len(body);
                        let restored = EditRange { start, end }.clamped(len);
                        self.ranges.set(&handle, restored);
                        Value::Bool(true)
                    }
                    _ => Value::Bool(false),
                }
            }
            ScriptRequest::RangeDispose { handle } => Value::Bool(self.ranges.dispose(&handle)),

            // Handled before dispatch; kept for exhaustiveness.
            ScriptRequest::Sleep { .. } => Value::Null,
        }
    }

    // ----- helpers --------------------------------------------------------

    fn node(&mut self, handle: &str) -> Option<usize> {
        if handle == "document" {
            return Some(self.tree.root());
        }
        self.identity.resolve(&self.tree, handle)
    }

    fn range(&self, handle: &str) -> Option<EditRange> {
        let range = self.ranges.get(handle)?;
        let len = self
            .tree
            .body()
            .map(|body| self.tree.flow_len(body))
            .unwrap_or(0);
        Some(range.clamped(len))
    }

    fn handle_value(&mut self, id: usize) -> Value {
        if self.tree.is_element(id) {
            Value::String(self.identity.handle_for(&mut self.tree, id))
        } else {
            Value::Null
        }
    }

    fn handle_list(&mut self, ids: Vec<usize>) -> Value {
        let mut handles = Vec::with_capacity(ids.len());
        for id in ids {
            if self.tree.is_element(id) {
                handles.push(Value::String(self.identity.handle_for(&mut self.tree, id)));
            }
        }
        Value::Array(handles)
    }

    fn flow(&self) -> String {
        self.tree
            .body()
            .map(|body| self.tree.flow_text(body))
            .unwrap_or_default()
    }

    fn clamped(&self, range: EditRange) -> EditRange {
        let len = self
            .tree
            .body()
            .map(|body| self.tree.flow_len(body))
            .unwrap_or(0);
        range.clamped(len)
    }

    fn covered_text(&self, range: EditRange) -> String {
        let flow = self.flow();
        flow.chars()
            .skip(range.start)
            .take(range.end.saturating_sub(range.start))
            .collect()
    }

    fn load_html(&mut self, html: &str) -> Value {
        self.tree = DomTree::from_html(html);
        self.identity.clear();
        self.ranges.clear();
        self.commands.clear();
        self.selection = EditRange::collapsed(0);
        self.focused = None;
        self.scroll.clear();
        debug!(target = "engine", "page reloaded; all handles invalidated");
        self.push_content();
        self.push_selection();
        Value::Null
    }

    fn insert_text(&mut self, text: &str) -> Value {
        let Some(body) = self.tree.body() else {
            return Value::Null;
        };
        let selection = self.clamped(self.selection);
        self.tree.delete_span(body, selection.start, selection.end);
        self.tree.insert_plain(body, selection.start, text);
        self.selection = EditRange::collapsed(selection.start + char_len(text));
        self.push_content();
        self.push_selection();
        Value::Null
    }

    fn click(&mut self, handle: &str) -> Value {
        let Some(id) = self.node(handle) else {
            return Value::Null;
        };
        self.focused = Some(id);

        if let Some(body) = self.tree.body() {
            if self.tree.contains(body, id) {
                if let Some(start) = self.tree.node_flow_start(body, id) {
                    self.selection = EditRange::collapsed(start);
                    self.push_selection();
                }
            }
        }

        if let Some(anchor) = self.enclosing_anchor(id) {
            let href = self.tree.attr(anchor, "href").map(|s| s.to_string());
            let text = self.tree.text_content(anchor);
            if let Some(href) = href {
                self.commands.set_link(href.clone(), text.clone());
                self.push(PushPayload::LinkContext {
                    href: Some(href),
                    text: Some(text),
                });
            }
        }
        Value::Null
    }

    fn enclosing_anchor(&self, id: usize) -> Option<usize> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.tree.tag_name(node) == Some("a") {
                return Some(node);
            }
            current = self.tree.get(node).and_then(|n| n.parent);
        }
        None
    }

    /// Replace a node with parsed markup. The node's handle goes stale; the
    /// replacement nodes mint fresh identities when next referenced.
    fn set_outer_html(&mut self, handle: &str, html: &str) -> Value {
        let Some(id) = self.node(handle) else {
            return Value::Null;
        };
        if id == self.tree.root() {
            return Value::Null;
        }
        let Some(parent) = self.tree.get(id).and_then(|node| node.parent) else {
            return Value::Null;
        };
        let Some(index) = self
            .tree
            .get(parent)
            .and_then(|node| node.children.iter().position(|&child| child == id))
        else {
            return Value::Null;
        };
        let fragment = self.tree.parse_fragment(html);
        self.tree.remove_subtree(id);
        self.tree.insert_children_at(parent, index, &fragment);
        self.push_content();
        Value::Null
    }

    fn range_paste_html(&mut self, handle: &str, html: &str) -> Value {
        let Some(range) = self.range(handle) else {
            return Value::Null;
        };
        let Some(body) = self.tree.body() else {
            return Value::Null;
        };
        let inserted = self.tree.replace_span(body, range.start, range.end, html);
        self.ranges
            .set(handle, EditRange::collapsed(range.start + inserted));
        self.selection = self.clamped(self.selection);
        self.push_content();
        Value::Null
    }

    fn exec_command(&mut self, command: NativeCommand, value: Option<String>) -> bool {
        let Some(body) = self.tree.body() else {
            return false;
        };
        let selection = self.clamped(self.selection);
        let selected_text = self.covered_text(selection);

        if let Some(tag) = CommandRegistry::wrap_tag(command) {
            if selected_text.is_empty() {
                self.commands.toggle(command);
            } else {
                let html = format!("<{tag}>{}</{tag}>", encode_text(&selected_text));
                let inserted = self
                    .tree
                    .replace_span(body, selection.start, selection.end, &html);
                self.selection = EditRange::collapsed(selection.start + inserted);
                self.commands.set_active(command, true);
                self.push_content();
                self.push_selection();
            }
            return true;
        }

        match command {
            NativeCommand::CreateLink => {
                let Some(href) = value else {
                    return false;
                };
                let label = if selected_text.is_empty() {
                    href.clone()
                } else {
                    selected_text
                };
                let html = format!(
                    "<a href=\"{}\">{}</a>",
                    encode_double_quoted_attribute(&href),
                    encode_text(&label)
                );
                let inserted = self
                    .tree
                    .replace_span(body, selection.start, selection.end, &html);
                self.selection = EditRange::collapsed(selection.start + inserted);
                self.commands.set_link(href.clone(), label.clone());
                self.push_content();
                self.push_selection();
                self.push(PushPayload::LinkContext {
                    href: Some(href),
                    text: Some(label),
                });
                true
            }
            NativeCommand::Unlink => {
                let had_link = self.commands.clear_link();
                if had_link {
                    self.push(PushPayload::LinkContext {
                        href: None,
                        text: None,
                    });
                }
                had_link
            }
            NativeCommand::RemoveFormat => {
                self.commands.reset_formatting();
                true
            }
            _ => {
                self.commands.toggle(command);
                true
            }
        }
    }

    // ----- geometry -------------------------------------------------------

    fn metrics(&self, id: usize) -> ElementMetrics {
        let text = self.tree.inner_text(id);
        let lines: Vec<&str> = text.split('\n').collect();
        let line_count = lines.len().max(1) as i64;
        let max_line = lines.iter().map(|line| char_len(line)).max().unwrap_or(0) as i64;
        let (scroll_left, scroll_top) = self.scroll.get(&id).copied().unwrap_or((0, 0));
        ElementMetrics {
            offset_left: 0,
            offset_top: self.offset_top(id),
            offset_width: COLUMN_WIDTH * max_line,
            offset_height: LINE_HEIGHT * line_count,
            scroll_left,
            scroll_top,
            scroll_width: COLUMN_WIDTH * max_line,
            scroll_height: LINE_HEIGHT * line_count,
        }
    }

    fn offset_top(&self, id: usize) -> i64 {
        let mut top = 0;
        let mut current = id;
        loop {
            let Some(parent) = self.tree.get(current).and_then(|node| node.parent) else {
                break;
            };
            if let Some(parent_node) = self.tree.get(parent) {
                let before = parent_node
                    .children
                    .iter()
                    .take_while(|&&child| child != current)
                    .filter(|&&child| self.tree.is_element(child))
                    .count();
                top += LINE_HEIGHT * before as i64;
            }
            if !self.tree.is_element(parent) {
                break;
            }
            current = parent;
        }
        top
    }

    fn scroll_into_view(&mut self, id: usize) {
        let target_top = self.offset_top(id);
        let mut current = self.tree.get(id).and_then(|node| node.parent);
        while let Some(ancestor) = current {
            if self.tree.is_element(ancestor) {
                let ancestor_top = self.offset_top(ancestor);
                let entry = self.scroll.entry(ancestor).or_insert((0, 0));
                entry.1 = (target_top - ancestor_top).max(0);
            }
            current = self.tree.get(ancestor).and_then(|node| node.parent);
        }
    }

    // ----- push channel ---------------------------------------------------

    fn push(&self, payload: PushPayload) {
        let _ = self.events.send(payload);
    }

    fn push_content(&mut self) {
        let Some(body) = self.tree.body() else { return };
        self.push(PushPayload::ContentChanged {
            html: self.tree.serialize_children(body),
            text: self.tree.inner_text(body),
        });
    }

    fn push_selection(&mut self) {
        let selection = self.clamped(self.selection);
        let text = self.covered_text(selection);
        let block = self.block_context(selection.start);
        self.push(PushPayload::SelectionChanged { text, block });
    }

    /// Mutations inside the editable region push fresh content state.
    fn push_after_mutation(&mut self, id: usize) {
        let Some(body) = self.tree.body() else { return };
        if id == body || self.tree.contains(body, id) {
            self.push_content();
        }
    }

    fn block_context(&self, pos: usize) -> Option<String> {
        let body = self.tree.body()?;
        let (node, _) = self.tree.pos_to_text_node(body, pos)?;
        let mut current = self.tree.get(node).and_then(|n| n.parent);
        while let Some(id) = current {
            if let Some(name) = self.tree.tag_name(id) {
                if is_block_element(name) {
                    return Some(name.to_string());
                }
            }
            current = self.tree.get(id).and_then(|n| n.parent);
        }
        None
    }
}

fn endpoint_selector(how: EndPointComparison) -> (bool, bool) {
    match how {
        EndPointComparison::StartToStart => (true, true),
        EndPointComparison::StartToEnd => (true, false),
        EndPointComparison::EndToStart => (false, true),
        EndPointComparison::EndToEnd => (false, false),
    }
}

// ----- inline style text -------------------------------------------------

fn style_entries(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|entry| {
            let (name, value) = entry.split_once(':')?;
            let name = name.trim();
            let value = value.trim();
            if name.is_empty() {
                None
            } else {
                Some((name.to_ascii_lowercase(), value.to_string()))
            }
        })
        .collect()
}

fn style_get(style: &str, name: &str) -> Option<String> {
    let wanted = name.to_ascii_lowercase();
    style_entries(style)
        .into_iter()
        .find(|(entry, _)| *entry == wanted)
        .map(|(_, value)| value)
}

fn style_set(style: &str, name: &str, value: &str) -> String {
    let wanted = name.to_ascii_lowercase();
    let mut entries = style_entries(style);
    match entries.iter_mut().find(|(entry, _)| *entry == wanted) {
        Some(entry) => entry.1 = value.to_string(),
        None => entries.push((wanted, value.to_string())),
    }
    entries
        .iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect::<Vec<_>>()
        .join("; ")
}
