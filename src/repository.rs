use crate::error::RepositoryError;
use crate::node::{Node, NodeIdentity};
use crate::value::PropertyValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindOptions {
    /// `false` forces a fresh fetch past any caching layer in the client.
    pub cache: bool,
}

impl FindOptions {
    pub fn cached() -> Self {
        Self { cache: true }
    }

    pub fn fresh() -> Self {
        Self { cache: false }
    }
}

impl Default for FindOptions {
    fn default() -> Self {
        Self::cached()
    }
}

/// Payload of a create-property request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProperty {
    pub name: String,
    pub value: PropertyValue,
    pub type_code: u8,
}

/// Client for the content repository. Every call is a single asynchronous request;
/// failures carry a response the notifier can turn into a user message.
#[allow(async_fn_in_trait)]
pub trait Repository {
    async fn find(
        &self,
        identity: &NodeIdentity,
        options: FindOptions,
    ) -> Result<Node, RepositoryError>;

    async fn rename(&self, identity: &NodeIdentity, new_name: &str) -> Result<(), RepositoryError>;

    async fn create_property(
        &self,
        identity: &NodeIdentity,
        property: NewProperty,
    ) -> Result<(), RepositoryError>;

    async fn remove_property(
        &self,
        identity: &NodeIdentity,
        name: &str,
    ) -> Result<(), RepositoryError>;
}
