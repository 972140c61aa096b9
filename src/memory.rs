//! In-process collaborators: a repository backed by a map of paths, a tree mirror,
//! and a notifier that records what it was told. Used by tests and embedders that
//! want to drive a session without a server.

use crate::error::RepositoryError;
use crate::node::{self, Node, NodeIdentity, PropertyMap};
use crate::notify::Notifier;
use crate::repository::{FindOptions, NewProperty, Repository};
use crate::statics;
use crate::tree::{self, TreeMirror};
use crate::value::PropertyValue;
use anyhow::Context;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::{fs, path::Path};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Find,
    Rename,
    CreateProperty,
    RemoveProperty,
}

/// Number of requests received per operation, failed ones included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub find: usize,
    pub rename: usize,
    pub create_property: usize,
    pub remove_property: usize,
}

impl CallCounts {
    pub fn mutations(&self) -> usize {
        self.rename + self.create_property + self.remove_property
    }

    pub fn total(&self) -> usize {
        self.find + self.mutations()
    }
}

#[derive(Debug, Default)]
struct RepositoryState {
    nodes: IndexMap<String, PropertyMap>,
    cache: HashMap<String, PropertyMap>,
    calls: CallCounts,
    failures: HashMap<Operation, RepositoryError>,
}

impl RepositoryState {
    fn begin(&mut self, op: Operation) -> Result<(), RepositoryError> {
        match op {
            Operation::Find => self.calls.find += 1,
            Operation::Rename => self.calls.rename += 1,
            Operation::CreateProperty => self.calls.create_property += 1,
            Operation::RemoveProperty => self.calls.remove_property += 1,
        }
        match self.failures.remove(&op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn node_mut(&mut self, path: &str) -> Result<&mut PropertyMap, RepositoryError> {
        self.nodes
            .get_mut(path)
            .ok_or_else(|| RepositoryError::NotFound {
                path: path.to_string(),
            })
    }
}

/// Single-workspace repository held in memory. Reads go through a cache that only a
/// fresh find (`FindOptions::fresh`) updates, so a cached find after a mutation sees old data.
#[derive(Debug)]
pub struct MemoryRepository {
    state: Mutex<RepositoryState>,
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRepository {
    /// An empty repository containing only the root node.
    pub fn new() -> Self {
        let mut state = RepositoryState::default();
        state
            .nodes
            .insert(statics::ROOT_PATH.to_string(), PropertyMap::new());
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn with_node(self, path: &str, properties: PropertyMap) -> Self {
        self.insert_node(path, properties);
        self
    }

    pub fn insert_node(&self, path: &str, properties: PropertyMap) {
        self.state.lock().nodes.insert(path.to_string(), properties);
    }

    /// Build a repository from a JSON5 document mapping node paths to property maps:
    /// `{ "/a": { title: { value: "A", type: 1 } } }`.
    pub fn from_json5(text: &str) -> anyhow::Result<Self> {
        let nodes: IndexMap<String, PropertyMap> =
            json5::from_str(text).context("parsing repository fixture")?;
        let repo = Self::new();
        for (path, properties) in nodes {
            anyhow::ensure!(
                path.starts_with(statics::PATH_SEPARATOR),
                "node path {path:?} is not absolute"
            );
            repo.insert_node(&path, properties);
        }
        Ok(repo)
    }

    pub fn load_path(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("reading {path:?}"))?;
        Self::from_json5(&text)
    }

    /// Make the next request of `op` fail with `err`.
    pub fn fail_next(&self, op: Operation, err: RepositoryError) {
        self.state.lock().failures.insert(op, err);
    }

    pub fn calls(&self) -> CallCounts {
        self.state.lock().calls
    }

    pub fn paths(&self) -> Vec<String> {
        self.state.lock().nodes.keys().cloned().collect()
    }

    pub fn properties(&self, path: &str) -> Option<PropertyMap> {
        self.state.lock().nodes.get(path).cloned()
    }

    pub fn property_value(&self, path: &str, name: &str) -> Option<PropertyValue> {
        let state = self.state.lock();
        state
            .nodes
            .get(path)
            .and_then(|props| props.get(name))
            .map(|prop| prop.value.clone())
    }
}

impl Repository for MemoryRepository {
    async fn find(
        &self,
        identity: &NodeIdentity,
        options: FindOptions,
    ) -> Result<Node, RepositoryError> {
        let mut state = self.state.lock();
        state.begin(Operation::Find)?;

        let path = identity.path.as_str();
        if options.cache
            && let Some(cached) = state.cache.get(path)
        {
            return Ok(Node::new(identity.clone(), cached.clone()));
        }

        let properties = state
            .nodes
            .get(path)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound {
                path: path.to_string(),
            })?;
        state.cache.insert(path.to_string(), properties.clone());
        Ok(Node::new(identity.clone(), properties))
    }

    async fn rename(&self, identity: &NodeIdentity, new_name: &str) -> Result<(), RepositoryError> {
        let mut state = self.state.lock();
        state.begin(Operation::Rename)?;

        let old_path = identity.path.as_str();
        if node::is_root_path(old_path) {
            return Err(RepositoryError::Rejected {
                status: 400,
                message: "The root node cannot be renamed".to_string(),
            });
        }
        if new_name.contains(statics::PATH_SEPARATOR) {
            return Err(RepositoryError::Rejected {
                status: 400,
                message: format!("Invalid node name {new_name:?}"),
            });
        }
        if !state.nodes.contains_key(old_path) {
            return Err(RepositoryError::NotFound {
                path: old_path.to_string(),
            });
        }
        let new_path = node::renamed_path(old_path, new_name);
        if state.nodes.contains_key(&new_path) {
            return Err(RepositoryError::Rejected {
                status: 409,
                message: format!("A node already exists at {new_path}"),
            });
        }

        let descendant_prefix = format!("{old_path}{}", statics::PATH_SEPARATOR);
        let moved: Vec<String> = state
            .nodes
            .keys()
            .filter(|p| p.as_str() == old_path || p.starts_with(&descendant_prefix))
            .cloned()
            .collect();
        for path in moved {
            state.cache.remove(&path);
            if let Some(properties) = state.nodes.shift_remove(&path) {
                let suffix = &path[old_path.len()..];
                state.nodes.insert(format!("{new_path}{suffix}"), properties);
            }
        }
        Ok(())
    }

    async fn create_property(
        &self,
        identity: &NodeIdentity,
        property: NewProperty,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock();
        state.begin(Operation::CreateProperty)?;

        let properties = state.node_mut(&identity.path)?;
        properties.insert(
            property.name,
            node::Property::new(property.value, property.type_code),
        );
        Ok(())
    }

    async fn remove_property(
        &self,
        identity: &NodeIdentity,
        name: &str,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock();
        state.begin(Operation::RemoveProperty)?;

        let properties = state.node_mut(&identity.path)?;
        match properties.shift_remove(name) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::PropertyNotFound {
                name: name.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeEntryId(usize);

#[derive(Debug, Clone)]
struct TreeEntry {
    attrs: IndexMap<String, String>,
    children: Vec<TreeEntryId>,
    parent: Option<TreeEntryId>,
}

/// Arena-backed tree mirror. Entries carry `name` and `path` attributes; the root entry is
/// named after the root marker.
#[derive(Debug, Clone)]
pub struct MemoryTree {
    entries: Vec<TreeEntry>,
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTree {
    const ROOT: TreeEntryId = TreeEntryId(0);

    pub fn new() -> Self {
        let mut attrs = IndexMap::new();
        attrs.insert(
            statics::TREE_ATTR_NAME.to_string(),
            statics::TREE_ROOT_NAME.to_string(),
        );
        attrs.insert(
            statics::TREE_ATTR_PATH.to_string(),
            statics::ROOT_PATH.to_string(),
        );
        Self {
            entries: vec![TreeEntry {
                attrs,
                children: Vec::new(),
                parent: None,
            }],
        }
    }

    /// Mirror the given content paths, creating missing ancestors along the way.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self::new();
        for path in paths {
            tree.ensure(path.as_ref());
        }
        tree
    }

    pub fn root(&self) -> TreeEntryId {
        Self::ROOT
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for `content_path`, creating it (and its ancestors) if needed.
    pub fn ensure(&mut self, content_path: &str) -> TreeEntryId {
        let mut current = Self::ROOT;
        let mut path = String::new();
        for segment in segments(content_path) {
            path.push(statics::PATH_SEPARATOR);
            path.push_str(segment);
            current = match self.child_named(current, segment) {
                Some(child) => child,
                None => self.push_child(current, segment, &path),
            };
        }
        current
    }

    /// Entry currently reachable at `content_path` by walking `name` attributes.
    pub fn entry_at(&self, content_path: &str) -> Option<TreeEntryId> {
        segments(content_path).try_fold(Self::ROOT, |current, segment| {
            self.child_named(current, segment)
        })
    }

    fn child_named(&self, parent: TreeEntryId, name: &str) -> Option<TreeEntryId> {
        self.entries[parent.0]
            .children
            .iter()
            .copied()
            .find(|child| self.attr(*child, statics::TREE_ATTR_NAME).as_deref() == Some(name))
    }

    fn push_child(&mut self, parent: TreeEntryId, name: &str, path: &str) -> TreeEntryId {
        let id = TreeEntryId(self.entries.len());
        let mut attrs = IndexMap::new();
        attrs.insert(statics::TREE_ATTR_NAME.to_string(), name.to_string());
        attrs.insert(statics::TREE_ATTR_PATH.to_string(), path.to_string());
        self.entries.push(TreeEntry {
            attrs,
            children: Vec::new(),
            parent: Some(parent),
        });
        self.entries[parent.0].children.push(id);
        id
    }
}

fn segments(content_path: &str) -> impl Iterator<Item = &str> {
    content_path
        .split(statics::PATH_SEPARATOR)
        .filter(|segment| !segment.is_empty())
}

impl TreeMirror for MemoryTree {
    type NodeId = TreeEntryId;

    async fn find(&self, tree_path: &str) -> Option<TreeEntryId> {
        let rest = tree_path.strip_prefix(statics::TREE_ROOT_PREFIX)?;
        if !rest.is_empty() && !rest.starts_with(statics::PATH_SEPARATOR) {
            return None;
        }
        self.entry_at(&tree::to_content_path(tree_path))
    }

    fn attr(&self, node: TreeEntryId, key: &str) -> Option<String> {
        self.entries.get(node.0)?.attrs.get(key).cloned()
    }

    fn set_attr(&mut self, node: TreeEntryId, key: &str, value: String) {
        if let Some(entry) = self.entries.get_mut(node.0) {
            entry.attrs.insert(key.to_string(), value);
        }
    }

    fn tree_path(&self, node: TreeEntryId) -> String {
        let mut names = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            let Some(entry) = self.entries.get(id.0) else {
                break;
            };
            names.push(
                entry
                    .attrs
                    .get(statics::TREE_ATTR_NAME)
                    .cloned()
                    .unwrap_or_default(),
            );
            current = entry.parent;
        }
        names.reverse();
        format!("{}{}", statics::PATH_SEPARATOR, names.join("/"))
    }

    fn children(&self, node: TreeEntryId) -> Vec<TreeEntryId> {
        self.entries
            .get(node.0)
            .map(|entry| entry.children.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Error(String),
}

/// Notifier that keeps every message in order of arrival.
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: Mutex<Vec<Notification>>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Notification> {
        self.entries.lock().clone()
    }

    pub fn successes(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter_map(|n| match n {
                Notification::Success(msg) => Some(msg.clone()),
                Notification::Error(_) => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter_map(|n| match n {
                Notification::Error(msg) => Some(msg.clone()),
                Notification::Success(_) => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Notifier for NotificationLog {
    fn success(&self, message: &str) {
        self.entries
            .lock()
            .push(Notification::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.entries
            .lock()
            .push(Notification::Error(message.to_string()));
    }
}
