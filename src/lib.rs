//! Core library for editing nodes of a hierarchical content repository.
//! Keeps a loaded node, its filtered property list, its edit forms and a client-side
//! tree mirror consistent across asynchronous rename/create/remove requests.

pub mod error;
pub mod filter;
pub mod memory;
mod node;
pub mod notify;
pub mod property_type;
pub mod repository;
mod session;
pub mod statics;
pub mod tree;
mod value;

pub use error::{
    RepositoryError, SessionError, SessionResult, TreeError, ValidationError, ValueError,
};
pub use filter::{DisplayProperty, FuzzyMatcher, SubsequenceMatcher, filter_properties};
pub use node::{
    Node, NodeIdentity, Property, PropertyMap, is_root_path, last_segment, parent_path,
    renamed_path,
};
pub use notify::{LogNotifier, Notifier};
pub use property_type::PropertyType;
pub use repository::{FindOptions, NewProperty, Repository};
pub use session::{
    DraggableData, DroppableData, EditState, FieldState, NodeSession, PropertyForm, RenameForm,
    RenameOutcome, SessionPhase,
};
pub use tree::{TreeMirror, TreeSynchronizer};
pub use value::{PropertyNumber, PropertyValue};
