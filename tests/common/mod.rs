//! Shared fixtures for the session integration tests.

#![allow(dead_code)]

use nodedit::memory::{MemoryRepository, MemoryTree, NotificationLog};
use nodedit::{NodeIdentity, NodeSession, SubsequenceMatcher};

pub type Session = NodeSession<MemoryRepository, SubsequenceMatcher, NotificationLog>;

pub const FIXTURE: &str = r#"{
  // Comments and trailing commas are fine in fixtures.
  "/": { "jcr:primaryType": { value: "rep:root", type: 7 } },
  "/content": { "jcr:primaryType": { value: "nt:unstructured", type: 7 } },
  "/content/blog": {
    title: { value: "Blog", type: 1 },
    count: { value: 3, type: 3 },
    published: { value: true, type: 6 },
  },
  "/content/blog/first": { title: { value: "First post", type: 1 } },
  "/content/blog/first/comments": {},
}"#;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn identity(path: &str) -> NodeIdentity {
    NodeIdentity::new("default", "default", path)
}

pub fn repository() -> MemoryRepository {
    MemoryRepository::from_json5(FIXTURE).expect("fixture parses")
}

pub fn tree() -> MemoryTree {
    MemoryTree::from_paths(["/content/blog/first/comments"])
}

pub fn session(repository: MemoryRepository) -> Session {
    NodeSession::new(repository, SubsequenceMatcher, NotificationLog::new())
}

pub async fn loaded(path: &str) -> Session {
    init_logging();
    let mut session = session(repository());
    session.load(identity(path), true).await.expect("load");
    session
}

pub fn displayed_names(session: &Session) -> Vec<String> {
    session
        .properties()
        .iter()
        .map(|p| p.name.clone())
        .collect()
}
