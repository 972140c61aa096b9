use crate::error::TreeError;
use crate::statics;

/// Client-side navigation tree that mirrors the repository hierarchy under a root marker
/// (`/a/b` lives at `/root/a/b`). The tree is owned by the caller; the session only edits it.
#[allow(async_fn_in_trait)]
pub trait TreeMirror {
    type NodeId: Copy;

    async fn find(&self, tree_path: &str) -> Option<Self::NodeId>;

    fn attr(&self, node: Self::NodeId, key: &str) -> Option<String>;

    fn set_attr(&mut self, node: Self::NodeId, key: &str, value: String);

    /// Path built from the `name` attributes up the hierarchy, root marker included.
    fn tree_path(&self, node: Self::NodeId) -> String;

    fn children(&self, node: Self::NodeId) -> Vec<Self::NodeId>;
}

/// Visit `start` and every node below it, parents before children.
pub fn walk_children<T, F>(tree: &mut T, start: T::NodeId, mut visit: F)
where
    T: TreeMirror,
    F: FnMut(&mut T, T::NodeId),
{
    let mut stack = vec![start];
    while let Some(node) = stack.pop() {
        visit(&mut *tree, node);
        let mut children = tree.children(node);
        children.reverse();
        stack.extend(children);
    }
}

pub fn to_tree_path(content_path: &str) -> String {
    if content_path == statics::ROOT_PATH {
        statics::TREE_ROOT_PREFIX.to_string()
    } else {
        format!("{}{content_path}", statics::TREE_ROOT_PREFIX)
    }
}

pub fn to_content_path(tree_path: &str) -> String {
    match tree_path.strip_prefix(statics::TREE_ROOT_PREFIX) {
        Some("") => statics::ROOT_PATH.to_string(),
        Some(rest) if rest.starts_with(statics::PATH_SEPARATOR) => rest.to_string(),
        _ => tree_path.to_string(),
    }
}

/// Keeps the tree mirror in step with renames committed to the repository.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeSynchronizer;

impl TreeSynchronizer {
    /// Rename the mirror entry for `old_path` to `new_name` and re-derive the `path` attribute
    /// of that entry and all of its descendants. Returns the renamed node's new content path.
    pub async fn on_renamed<T: TreeMirror>(
        tree: &mut T,
        old_path: &str,
        new_name: &str,
    ) -> Result<String, TreeError> {
        let tree_path = to_tree_path(old_path);
        let Some(entry) = tree.find(&tree_path).await else {
            log::warn!("tree mirror has no entry at {tree_path}");
            return Err(TreeError::NotFoundInTree { path: tree_path });
        };

        tree.set_attr(entry, statics::TREE_ATTR_NAME, new_name.to_string());

        walk_children(tree, entry, |tree, node| {
            let path = to_content_path(&tree.tree_path(node));
            tree.set_attr(node, statics::TREE_ATTR_PATH, path);
        });

        let new_path = tree
            .attr(entry, statics::TREE_ATTR_PATH)
            .unwrap_or_else(|| to_content_path(&tree.tree_path(entry)));
        log::debug!("tree mirror {old_path} -> {new_path}");
        Ok(new_path)
    }
}
