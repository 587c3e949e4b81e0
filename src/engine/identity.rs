//! Identity registry: opaque handles stored as an attribute on the node.
//!
//! A handle is minted lazily the first time a node is returned across the
//! bridge and written into [`IDENTITY_ATTR`], so two calls about the same
//! node always yield the same handle while the attribute survives. There is
//! no host-side object table to leak; the cost is that presentation copies
//! of a subtree must strip the attribute explicitly.

use std::collections::HashMap;

use uuid::Uuid;

use super::document::{DomTree, IDENTITY_ATTR};

#[derive(Default)]
pub struct IdentityIndex {
    index: HashMap<String, usize>,
}

impl IdentityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for a node, minting and writing the identity attribute if the
    /// node does not carry one yet.
    pub fn handle_for(&mut self, tree: &mut DomTree, id: usize) -> String {
        if let Some(existing) = tree.attr(id, IDENTITY_ATTR) {
            let handle = existing.to_string();
            self.index.insert(handle.clone(), id);
            return handle;
        }
        let handle = format!("n-{}", Uuid::new_v4().simple());
        tree.set_attr(id, IDENTITY_ATTR, &handle);
        self.index.insert(handle.clone(), id);
        handle
    }

    /// Resolve a handle to a live node. The index is consulted first and
    /// rebuilt from the tree on a miss; a handle that still misses after the
    /// rescan is stale and resolves to `None`.
    pub fn resolve(&mut self, tree: &DomTree, handle: &str) -> Option<usize> {
        if let Some(&id) = self.index.get(handle) {
            if tree.attr(id, IDENTITY_ATTR) == Some(handle) {
                return Some(id);
            }
        }
        self.reindex(tree);
        self.index.get(handle).copied()
    }

    pub fn reindex(&mut self, tree: &DomTree) {
        self.index.clear();
        for id in tree.node_ids() {
            if let Some(handle) = tree.attr(id, IDENTITY_ATTR) {
                self.index.insert(handle.to_string(), id);
            }
        }
    }

    /// Strip identity attributes from a subtree, forgetting the affected
    /// handles. Used before handing markup to presentation surfaces.
    pub fn strip(&mut self, tree: &mut DomTree, id: usize) {
        tree.strip_attr_recursive(id, IDENTITY_ATTR);
        self.index.retain(|_, &mut indexed| !tree.contains(id, indexed));
    }

    pub fn clear(&mut self) {
        self.index.clear();
    }
}
