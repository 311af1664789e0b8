use std::collections::HashMap;

use super::store::NodeStore;
use crate::errors::{GraphError, Result};
use crate::model::{Path, PropertyMap, PropertyValue, Segment};

/// Stable arena slot of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SlotKey(usize);

#[derive(Debug, Clone, Default)]
struct MemNode {
    parent: Option<SlotKey>,
    children: HashMap<Segment, SlotKey>,
    properties: PropertyMap,
}

/// In-memory tree store
///
/// Nodes live in an arena; parent and child relations are slot lookups rather
/// than references. Children are kept in a hash map, so the store has no
/// notion of order, just like a distributed cache.
/// Not thread-safe on its own - sources wrap it in a mutex.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    slots: Vec<Option<MemNode>>,
    free: Vec<usize>,
}

const ROOT: SlotKey = SlotKey(0);

impl MemoryStore {
    /// Create a store holding only the root node
    pub fn new() -> Self {
        Self {
            slots: vec![Some(MemNode::default())],
            free: Vec::new(),
        }
    }

    /// Number of live nodes, root included
    pub fn node_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    fn lookup(&self, path: &Path) -> Option<SlotKey> {
        let mut key = ROOT;
        for segment in path.segments() {
            key = *self.node(key)?.children.get(segment)?;
        }
        Some(key)
    }

    fn require(&self, path: &Path, op: &str) -> Result<SlotKey> {
        self.lookup(path)
            .ok_or_else(|| GraphError::store(op, format!("no node at {}", path)))
    }

    fn node(&self, key: SlotKey) -> Option<&MemNode> {
        self.slots.get(key.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, key: SlotKey, op: &str) -> Result<&mut MemNode> {
        self.slots
            .get_mut(key.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| GraphError::store(op, format!("dangling slot {}", key.0)))
    }

    fn allocate(&mut self, node: MemNode) -> SlotKey {
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(node);
                SlotKey(index)
            }
            None => {
                self.slots.push(Some(node));
                SlotKey(self.slots.len() - 1)
            }
        }
    }

    /// Release a node and every descendant slot
    fn release(&mut self, key: SlotKey) {
        let mut pending = vec![key];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.slots.get_mut(next.0).and_then(Option::take) {
                pending.extend(node.children.into_values());
                self.free.push(next.0);
            }
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.lookup(path).is_some())
    }

    fn properties(&self, path: &Path) -> Result<PropertyMap> {
        let key = self.require(path, "properties")?;
        Ok(self
            .node(key)
            .map(|n| n.properties.clone())
            .unwrap_or_default())
    }

    fn put_property(&mut self, path: &Path, name: &str, values: Vec<PropertyValue>) -> Result<()> {
        let key = self.require(path, "put_property")?;
        self.node_mut(key, "put_property")?
            .properties
            .insert(name.to_string(), values);
        Ok(())
    }

    fn remove_property(&mut self, path: &Path, name: &str) -> Result<()> {
        let key = self.require(path, "remove_property")?;
        self.node_mut(key, "remove_property")?.properties.remove(name);
        Ok(())
    }

    fn replace_properties(&mut self, path: &Path, properties: PropertyMap) -> Result<()> {
        let key = self.require(path, "replace_properties")?;
        self.node_mut(key, "replace_properties")?.properties = properties;
        Ok(())
    }

    fn child_segments(&self, path: &Path) -> Result<Vec<Segment>> {
        let key = self.require(path, "child_segments")?;
        Ok(self
            .node(key)
            .map(|n| n.children.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn add_child(&mut self, parent: &Path, segment: &Segment) -> Result<()> {
        let parent_key = self.require(parent, "add_child")?;
        if self
            .node(parent_key)
            .is_some_and(|n| n.children.contains_key(segment))
        {
            return Err(GraphError::store(
                "add_child",
                format!("{} already has a child {}", parent, segment),
            ));
        }
        let child = self.allocate(MemNode {
            parent: Some(parent_key),
            ..MemNode::default()
        });
        self.node_mut(parent_key, "add_child")?
            .children
            .insert(segment.clone(), child);
        Ok(())
    }

    fn remove_child(&mut self, parent: &Path, segment: &Segment) -> Result<()> {
        let parent_key = self.require(parent, "remove_child")?;
        let child = self
            .node_mut(parent_key, "remove_child")?
            .children
            .remove(segment)
            .ok_or_else(|| {
                GraphError::store("remove_child", format!("{} has no child {}", parent, segment))
            })?;
        self.release(child);
        Ok(())
    }

    fn move_node(&mut self, path: &Path, new_parent: &Path) -> Result<()> {
        let segment = path
            .last_segment()
            .cloned()
            .ok_or_else(|| GraphError::store("move_node", "the root cannot be moved"))?;
        if path.is_at_or_above(new_parent) {
            return Err(GraphError::store(
                "move_node",
                format!("cannot move {} beneath itself", path),
            ));
        }
        let key = self.require(path, "move_node")?;
        let target = self.require(new_parent, "move_node")?;
        if self
            .node(target)
            .is_some_and(|n| n.children.contains_key(&segment))
        {
            return Err(GraphError::store(
                "move_node",
                format!("{} already has a child {}", new_parent, segment),
            ));
        }

        let old_parent = self
            .node(key)
            .and_then(|n| n.parent)
            .ok_or_else(|| GraphError::store("move_node", format!("{} has no parent", path)))?;
        self.node_mut(old_parent, "move_node")?.children.remove(&segment);
        self.node_mut(target, "move_node")?
            .children
            .insert(segment, key);
        self.node_mut(key, "move_node")?.parent = Some(target);
        Ok(())
    }
}
