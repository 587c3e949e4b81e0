//! In-memory document tree owned by the engine worker.
//!
//! Nodes live in an arena keyed by monotonically increasing ids; removing a
//! subtree drops its nodes from the arena, so lookups against removed nodes
//! simply miss. Offsets into the text flow are character offsets, not byte
//! offsets.

use std::collections::HashMap;

use html_escape::{encode_double_quoted_attribute, encode_text};
use kuchiki::traits::TendrilSink;
use kuchiki::NodeRef;

/// Attribute carrying a node's identity handle.
pub const IDENTITY_ATTR: &str = "data-tether-node";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const BLOCK_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "dd",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "tr",
    "ul",
];

pub fn is_block_element(name: &str) -> bool {
    BLOCK_ELEMENTS.contains(&name)
}

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

pub fn char_to_byte(s: &str, index: usize) -> usize {
    s.char_indices()
        .nth(index)
        .map(|(byte, _)| byte)
        .unwrap_or(s.len())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Element { name: String, attrs: Vec<Attribute> },
    Text { content: String },
    Comment { content: String },
}

#[derive(Debug)]
pub struct Node {
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub data: NodeData,
}

pub struct DomTree {
    nodes: HashMap<usize, Node>,
    next_id: usize,
    root: usize,
}

impl DomTree {
    /// Parse a full document. The parser normalizes the tree into the usual
    /// html/head/body shape even for bare fragments.
    pub fn from_html(html: &str) -> Self {
        let mut tree = Self {
            nodes: HashMap::new(),
            next_id: 0,
            root: 0,
        };
        let root = tree.insert(NodeData::Document);
        tree.root = root;

        let parsed = kuchiki::parse_html().one(html);
        for child in parsed.children() {
            tree.import(&child, Some(root));
        }
        tree
    }

    pub fn root(&self) -> usize {
        self.root
    }

    pub fn get(&self, id: usize) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_ids(&self) -> Vec<usize> {
        self.nodes.keys().copied().collect()
    }

    /// First `body` element in document order.
    pub fn body(&self) -> Option<usize> {
        self.find_elements(self.root, &mut |name, _| name == "body")
            .into_iter()
            .next()
    }

    fn insert(&mut self, data: NodeData) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                parent: None,
                children: Vec::new(),
                data,
            },
        );
        id
    }

    pub fn create_element(&mut self, name: &str, attrs: Vec<Attribute>) -> usize {
        self.insert(NodeData::Element {
            name: name.to_ascii_lowercase(),
            attrs,
        })
    }

    pub fn create_text(&mut self, content: &str) -> usize {
        self.insert(NodeData::Text {
            content: content.to_string(),
        })
    }

    pub fn create_comment(&mut self, content: &str) -> usize {
        self.insert(NodeData::Comment {
            content: content.to_string(),
        })
    }

    pub fn append_child(&mut self, parent: usize, child: usize) {
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
    }

    pub fn insert_children_at(&mut self, parent: usize, index: usize, children: &[usize]) {
        for &child in children {
            if let Some(node) = self.nodes.get_mut(&child) {
                node.parent = Some(parent);
            }
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            let index = index.min(node.children.len());
            for (offset, &child) in children.iter().enumerate() {
                node.children.insert(index + offset, child);
            }
        }
    }

    pub fn detach(&mut self, id: usize) {
        let parent = self.nodes.get(&id).and_then(|node| node.parent);
        if let Some(parent) = parent {
            if let Some(node) = self.nodes.get_mut(&parent) {
                node.children.retain(|&child| child != id);
            }
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = None;
        }
    }

    /// Detach a node and drop it and all of its descendants from the arena.
    pub fn remove_subtree(&mut self, id: usize) {
        self.detach(id);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children);
            }
        }
    }

    pub fn tag_name(&self, id: usize) -> Option<&str> {
        match &self.get(id)?.data {
            NodeData::Element { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn is_element(&self, id: usize) -> bool {
        self.tag_name(id).is_some()
    }

    /// Parent, but only while it is an element; the document root is not
    /// exposed through the object model.
    pub fn parent_element(&self, id: usize) -> Option<usize> {
        let parent = self.get(id)?.parent?;
        if self.is_element(parent) {
            Some(parent)
        } else {
            None
        }
    }

    pub fn element_children(&self, id: usize) -> Vec<usize> {
        self.get(id)
            .map(|node| {
                node.children
                    .iter()
                    .copied()
                    .filter(|&child| self.is_element(child))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether `ancestor` contains `descendant` (inclusive of itself).
    pub fn contains(&self, ancestor: usize, descendant: usize) -> bool {
        let mut current = Some(descendant);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).and_then(|node| node.parent);
        }
        false
    }

    pub fn attr(&self, id: usize, name: &str) -> Option<&str> {
        match &self.get(id)?.data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|attr| attr.name.eq_ignore_ascii_case(name))
                .map(|attr| attr.value.as_str()),
            _ => None,
        }
    }

    pub fn set_attr(&mut self, id: usize, name: &str, value: &str) {
        let normalized = name.to_ascii_lowercase();
        if let Some(node) = self.nodes.get_mut(&id) {
            if let NodeData::Element { attrs, .. } = &mut node.data {
                if let Some(attr) = attrs.iter_mut().find(|attr| attr.name == normalized) {
                    attr.value = value.to_string();
                } else {
                    attrs.push(Attribute {
                        name: normalized,
                        value: value.to_string(),
                    });
                }
            }
        }
    }

    pub fn remove_attr(&mut self, id: usize, name: &str) {
        let normalized = name.to_ascii_lowercase();
        if let Some(node) = self.nodes.get_mut(&id) {
            if let NodeData::Element { attrs, .. } = &mut node.data {
                attrs.retain(|attr| attr.name != normalized);
            }
        }
    }

    pub fn strip_attr_recursive(&mut self, id: usize, name: &str) {
        self.remove_attr(id, name);
        let children = self
            .get(id)
            .map(|node| node.children.clone())
            .unwrap_or_default();
        for child in children {
            self.strip_attr_recursive(child, name);
        }
    }

    /// Elements under `root` (excluding `root` itself) matching the
    /// predicate, in document order.
    pub fn find_elements(
        &self,
        root: usize,
        predicate: &mut dyn FnMut(&str, &[Attribute]) -> bool,
    ) -> Vec<usize> {
        let mut found = Vec::new();
        let mut stack: Vec<usize> = self
            .get(root)
            .map(|node| node.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.get(id) {
                if let NodeData::Element { name, attrs } = &node.data {
                    if predicate(name, attrs) {
                        found.push(id);
                    }
                }
                stack.extend(node.children.iter().rev());
            }
        }
        found
    }

    pub fn text_content(&self, id: usize) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: usize, out: &mut String) {
        let Some(node) = self.get(id) else { return };
        if let NodeData::Text { content } = &node.data {
            out.push_str(content);
        }
        for &child in &node.children {
            self.collect_text(child, out);
        }
    }

    /// Rendered-text approximation: `br` becomes a newline and block-level
    /// elements terminate their line.
    pub fn inner_text(&self, id: usize) -> String {
        let mut out = String::new();
        self.collect_inner_text(id, &mut out);
        while out.ends_with('\n') {
            out.pop();
        }
        out
    }

    fn collect_inner_text(&self, id: usize, out: &mut String) {
        let Some(node) = self.get(id) else { return };
        let children = node.children.clone();
        for child in children {
            let Some(child_node) = self.get(child) else {
                continue;
            };
            match &child_node.data {
                NodeData::Text { content } => out.push_str(content),
                NodeData::Element { name, .. } if name == "br" => out.push('\n'),
                NodeData::Element { name, .. } => {
                    let block = is_block_element(name);
                    self.collect_inner_text(child, out);
                    if block && !out.is_empty() && !out.ends_with('\n') {
                        out.push('\n');
                    }
                }
                _ => {}
            }
        }
    }

    pub fn serialize_children(&self, id: usize) -> String {
        let mut out = String::new();
        if let Some(node) = self.get(id) {
            for &child in &node.children {
                self.serialize_node_into(child, &mut out);
            }
        }
        out
    }

    pub fn serialize_node(&self, id: usize) -> String {
        let mut out = String::new();
        self.serialize_node_into(id, &mut out);
        out
    }

    fn serialize_node_into(&self, id: usize, out: &mut String) {
        let Some(node) = self.get(id) else { return };
        match &node.data {
            NodeData::Document => {
                for &child in &node.children {
                    self.serialize_node_into(child, out);
                }
            }
            NodeData::Element { name, attrs } => {
                out.push('<');
                out.push_str(name);
                for attr in attrs {
                    out.push(' ');
                    out.push_str(&attr.name);
                    out.push_str("=\"");
                    out.push_str(&encode_double_quoted_attribute(&attr.value));
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&name.as_str()) {
                    return;
                }
                for &child in &node.children {
                    self.serialize_node_into(child, out);
                }
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
            NodeData::Text { content } => {
                out.push_str(&encode_text(content));
            }
            NodeData::Comment { content } => {
                out.push_str("<!--");
                out.push_str(content);
                out.push_str("-->");
            }
        }
    }

    pub fn document_html(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>");
        out.push_str(&self.serialize_children(self.root));
        out
    }

    pub fn set_inner_html(&mut self, id: usize, html: &str) {
        let children = self
            .get(id)
            .map(|node| node.children.clone())
            .unwrap_or_default();
        for child in children {
            self.remove_subtree(child);
        }
        let fragment = self.parse_fragment(html);
        for root in fragment {
            self.append_child(id, root);
        }
    }

    pub fn set_inner_text(&mut self, id: usize, text: &str) {
        let children = self
            .get(id)
            .map(|node| node.children.clone())
            .unwrap_or_default();
        for child in children {
            self.remove_subtree(child);
        }
        if !text.is_empty() {
            let node = self.create_text(text);
            self.append_child(id, node);
        }
    }

    /// Parse an HTML fragment into the arena, returning the detached
    /// top-level nodes.
    pub fn parse_fragment(&mut self, html: &str) -> Vec<usize> {
        let parsed = kuchiki::parse_html().one(html);
        let container = fragment_container(&parsed);
        let mut roots = Vec::new();
        if let Some(container) = container {
            for child in container.children() {
                if let Some(id) = self.import(&child, None) {
                    roots.push(id);
                }
            }
        }
        roots
    }

    fn import(&mut self, node: &NodeRef, parent: Option<usize>) -> Option<usize> {
        let id = if let Some(element) = node.as_element() {
            let name = element.name.local.as_ref().to_ascii_lowercase();
            let attrs = element
                .attributes
                .borrow()
                .map
                .iter()
                .map(|(name, attr)| Attribute {
                    name: name.local.as_ref().to_ascii_lowercase(),
                    value: attr.value.clone(),
                })
                .collect();
            let id = self.create_element(&name, attrs);
            for child in node.children() {
                self.import(&child, Some(id));
            }
            id
        } else if let Some(text) = node.as_text() {
            self.create_text(text.borrow().as_str())
        } else if let Some(comment) = node.as_comment() {
            self.create_comment(comment.borrow().as_str())
        } else {
            // Doctype and processing instructions are not represented.
            return None;
        };

        if let Some(parent) = parent {
            self.append_child(parent, id);
        }
        Some(id)
    }

    // ----- text flow ------------------------------------------------------

    /// Text nodes under `root` in document order, with character lengths.
    pub fn flow_segments(&self, root: usize) -> Vec<(usize, usize)> {
        let mut segments = Vec::new();
        self.collect_flow(root, &mut segments);
        segments
    }

    fn collect_flow(&self, id: usize, segments: &mut Vec<(usize, usize)>) {
        let Some(node) = self.get(id) else { return };
        if let NodeData::Text { content } = &node.data {
            segments.push((id, char_len(content)));
        }
        for &child in &node.children {
            self.collect_flow(child, segments);
        }
    }

    pub fn flow_text(&self, root: usize) -> String {
        self.text_content(root)
    }

    pub fn flow_len(&self, root: usize) -> usize {
        self.flow_segments(root)
            .into_iter()
            .map(|(_, len)| len)
            .sum()
    }

    /// Map an absolute flow position to (text node, local character offset).
    /// A position on a node boundary maps to the end of the earlier node.
    pub fn pos_to_text_node(&self, root: usize, pos: usize) -> Option<(usize, usize)> {
        let mut cursor = 0usize;
        for (id, len) in self.flow_segments(root) {
            if pos <= cursor + len {
                return Some((id, pos - cursor));
            }
            cursor += len;
        }
        None
    }

    /// Characters of flow text preceding `target` within `root`'s flow.
    pub fn node_flow_start(&self, root: usize, target: usize) -> Option<usize> {
        let mut acc = 0usize;
        if self.flow_start_walk(root, target, &mut acc) {
            Some(acc)
        } else {
            None
        }
    }

    fn flow_start_walk(&self, id: usize, target: usize, acc: &mut usize) -> bool {
        if id == target {
            return true;
        }
        let Some(node) = self.get(id) else {
            return false;
        };
        if let NodeData::Text { content } = &node.data {
            *acc += char_len(content);
            return false;
        }
        for &child in &node.children {
            if self.flow_start_walk(child, target, acc) {
                return true;
            }
        }
        false
    }

    /// Remove the characters covered by `[start, end)` from the flow,
    /// dropping text nodes that become empty.
    pub fn delete_span(&mut self, root: usize, start: usize, end: usize) {
        if end <= start {
            return;
        }
        let mut cursor = 0usize;
        let mut edits: Vec<(usize, usize, usize)> = Vec::new();
        for (id, len) in self.flow_segments(root) {
            let node_start = cursor;
            let node_end = cursor + len;
            cursor = node_end;
            if node_end <= start {
                continue;
            }
            if node_start >= end {
                break;
            }
            let local_start = start.saturating_sub(node_start).min(len);
            let local_end = (end - node_start).min(len);
            edits.push((id, local_start, local_end));
        }

        let mut emptied = Vec::new();
        for (id, local_start, local_end) in edits {
            if let Some(node) = self.nodes.get_mut(&id) {
                if let NodeData::Text { content } = &mut node.data {
                    let start_byte = char_to_byte(content, local_start);
                    let end_byte = char_to_byte(content, local_end);
                    content.replace_range(start_byte..end_byte, "");
                    if content.is_empty() {
                        emptied.push(id);
                    }
                }
            }
        }
        for id in emptied {
            self.remove_subtree(id);
        }
    }

    /// Insert plain text at a flow position.
    pub fn insert_plain(&mut self, root: usize, pos: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some((id, local)) = self.pos_to_text_node(root, pos) {
            if let Some(node) = self.nodes.get_mut(&id) {
                if let NodeData::Text { content } = &mut node.data {
                    let byte = char_to_byte(content, local);
                    content.insert_str(byte, text);
                    return;
                }
            }
        }
        let node = self.create_text(text);
        self.append_child(root, node);
    }

    /// Replace the characters covered by `[start, end)` with a parsed HTML
    /// fragment. Returns the number of flow characters the fragment
    /// contributed.
    pub fn replace_span(&mut self, root: usize, start: usize, end: usize, html: &str) -> usize {
        let fragment = self.parse_fragment(html);
        let inserted: usize = fragment
            .iter()
            .map(|&id| char_len(&self.text_content(id)))
            .sum();
        self.delete_span(root, start, end);

        match self.pos_to_text_node(root, start) {
            Some((node, local)) => {
                let parent = self.get(node).and_then(|n| n.parent).unwrap_or(root);
                let index = self
                    .get(parent)
                    .and_then(|p| p.children.iter().position(|&c| c == node))
                    .unwrap_or(0);
                let node_len = match self.get(node).map(|n| &n.data) {
                    Some(NodeData::Text { content }) => char_len(content),
                    _ => 0,
                };
                if local == 0 {
                    self.insert_children_at(parent, index, &fragment);
                } else if local >= node_len {
                    self.insert_children_at(parent, index + 1, &fragment);
                } else {
                    let tail = {
                        let node_ref = self.nodes.get_mut(&node);
                        match node_ref.map(|n| &mut n.data) {
                            Some(NodeData::Text { content }) => {
                                let byte = char_to_byte(content, local);
                                content.split_off(byte)
                            }
                            _ => String::new(),
                        }
                    };
                    let tail_node = self.create_text(&tail);
                    self.insert_children_at(parent, index + 1, &[tail_node]);
                    self.insert_children_at(parent, index + 1, &fragment);
                }
            }
            None => {
                for &id in &fragment {
                    self.append_child(root, id);
                }
            }
        }
        inserted
    }

    // ----- node paths -----------------------------------------------------

    /// Child-index chain from the document root down to `id`.
    pub fn path_from_root(&self, id: usize) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        let mut current = id;
        while current != self.root {
            let parent = self.get(current)?.parent?;
            let index = self
                .get(parent)?
                .children
                .iter()
                .position(|&child| child == current)?;
            path.push(index);
            current = parent;
        }
        path.reverse();
        Some(path)
    }

    pub fn resolve_path(&self, path: &[usize]) -> Option<usize> {
        let mut current = self.root;
        for &index in path {
            current = *self.get(current)?.children.get(index)?;
        }
        Some(current)
    }
}

fn fragment_container(document: &NodeRef) -> Option<NodeRef> {
    for child in document.children() {
        if let Some(element) = child.as_element() {
            if element.name.local.as_ref().eq_ignore_ascii_case("html") {
                for inner in child.children() {
                    if let Some(inner_element) = inner.as_element() {
                        if inner_element.name.local.as_ref().eq_ignore_ascii_case("body") {
                            return Some(inner);
                        }
                    }
                }
            }
        }
    }
    None
}
