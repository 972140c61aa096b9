use crate::PropertyValue;
use crate::property_type;
use crate::statics;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Location of a node: repository, workspace and absolute path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeIdentity {
    pub repository: String,
    pub workspace: String,
    pub path: String,
}

impl NodeIdentity {
    /// An empty path addresses the root.
    pub fn new(
        repository: impl Into<String>,
        workspace: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        let path = path.into();
        Self {
            repository: repository.into(),
            workspace: workspace.into(),
            path: if path.is_empty() {
                statics::ROOT_PATH.to_string()
            } else {
                path
            },
        }
    }

    pub fn with_path(&self, path: impl Into<String>) -> Self {
        Self::new(self.repository.clone(), self.workspace.clone(), path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub value: PropertyValue,
    #[serde(rename = "type", default)]
    pub type_code: u8,
}

impl Property {
    pub fn new(value: PropertyValue, type_code: u8) -> Self {
        Self { value, type_code }
    }

    pub fn type_name(&self) -> &'static str {
        property_type::name_of(self.type_code)
    }
}

pub type PropertyMap = IndexMap<String, Property>;

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub identity: NodeIdentity,
    pub name: String,
    pub properties: PropertyMap,
}

impl Node {
    pub fn new(identity: NodeIdentity, properties: PropertyMap) -> Self {
        let name = last_segment(&identity.path).to_string();
        Self {
            identity,
            name,
            properties,
        }
    }

    pub fn path(&self) -> &str {
        &self.identity.path
    }

    pub fn is_root(&self) -> bool {
        is_root_path(self.path())
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }
}

pub fn is_root_path(path: &str) -> bool {
    path == statics::ROOT_PATH
}

/// Last path segment; empty for the root.
pub fn last_segment(path: &str) -> &str {
    path.rsplit(statics::PATH_SEPARATOR).next().unwrap_or_default()
}

pub fn parent_path(path: &str) -> &str {
    match path.rfind(statics::PATH_SEPARATOR) {
        Some(0) | None => statics::ROOT_PATH,
        Some(idx) => &path[..idx],
    }
}

pub fn join_path(parent: &str, name: &str) -> String {
    if is_root_path(parent) {
        format!("{}{name}", statics::ROOT_PATH)
    } else {
        format!("{parent}{}{name}", statics::PATH_SEPARATOR)
    }
}

/// Path of the node at `path` after its last segment becomes `new_name`.
pub fn renamed_path(path: &str, new_name: &str) -> String {
    join_path(parent_path(path), new_name)
}
