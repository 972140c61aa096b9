use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use nodedit::memory::Operation;
use nodedit::{
    DraggableData, DroppableData, EditState, FieldState, LogNotifier, NodeSession, PropertyForm,
    PropertyValue, RepositoryError, SessionError, SessionPhase, SubsequenceMatcher,
    ValidationError, statics,
};

mod common;
use common::{displayed_names, identity, loaded, repository, session};

#[tokio::test]
async fn display_list_carries_values_and_type_names() {
    let session = loaded("/content/blog").await;

    assert_eq!(displayed_names(&session), vec!["title", "count", "published"]);
    let rows = session.properties();
    assert_eq!(rows[0].value, PropertyValue::from("Blog"));
    assert_eq!(rows[0].type_name, "String");
    assert_eq!(rows[1].value.as_i64(), Some(3));
    assert_eq!(rows[1].type_name, "Long");
    assert_eq!(rows[2].type_name, "Boolean");
}

#[tokio::test]
async fn search_term_changes_recompute_the_list() {
    let mut session = loaded("/content/blog").await;

    session.set_search(Some("pub".to_string()));
    assert_eq!(displayed_names(&session), vec!["published"]);

    session.set_search(Some("pub".to_string()));
    assert_eq!(displayed_names(&session), vec!["published"]);

    session.set_search(None);
    assert_eq!(displayed_names(&session), vec!["title", "count", "published"]);
}

#[tokio::test]
async fn search_term_set_before_load_applies_to_the_loaded_node() {
    common::init_logging();
    let mut session = session(repository());
    session.set_search(Some("title".to_string()));
    assert!(session.properties().is_empty());

    session
        .load(identity("/content/blog"), true)
        .await
        .expect("load");
    assert_eq!(displayed_names(&session), vec!["title"]);
}

#[tokio::test]
async fn failed_load_keeps_the_previous_node() {
    let mut session = loaded("/content/blog").await;

    let err = session
        .load(identity("/content/missing"), true)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        SessionError::Repository(RepositoryError::NotFound {
            path: "/content/missing".to_string()
        })
    );
    assert_eq!(session.phase(), SessionPhase::Loaded);
    assert_eq!(session.node().map(|n| n.path()), Some("/content/blog"));
    assert_eq!(displayed_names(&session).len(), 3);
}

#[tokio::test]
async fn empty_name_or_value_never_reaches_the_repository() {
    let mut session = loaded("/content/blog").await;
    session.open_property_form();

    let cases = [
        (PropertyForm::new("", "x"), ValidationError::EmptyName),
        (PropertyForm::new("  ", "x"), ValidationError::EmptyName),
        (
            PropertyForm {
                name: None,
                value: Some("x".to_string()),
                type_code: None,
            },
            ValidationError::EmptyName,
        ),
        (PropertyForm::new("n", ""), ValidationError::EmptyValue),
        (PropertyForm::new("n", " \t "), ValidationError::EmptyValue),
    ];

    for (form, expected) in cases {
        let err = session.submit_property(form).await.unwrap_err();
        assert_eq!(err, SessionError::Validation(expected));
    }

    assert_eq!(session.repository().calls().create_property, 0);
    assert_eq!(
        session.notifier().errors(),
        vec![
            statics::EN_ERR_NAME_EMPTY,
            statics::EN_ERR_NAME_EMPTY,
            statics::EN_ERR_NAME_EMPTY,
            statics::EN_ERR_VALUE_EMPTY,
            statics::EN_ERR_VALUE_EMPTY,
        ]
    );
    assert_eq!(session.edit_state(), EditState::PropertyPending);
}

#[tokio::test]
async fn numeric_literal_is_stored_as_a_number() {
    let mut session = loaded("/content/blog").await;
    session.open_property_form();

    session
        .submit_property(PropertyForm::new("n", "42"))
        .await
        .expect("create");

    let stored = session
        .repository()
        .properties("/content/blog")
        .and_then(|props| props.get("n").cloned())
        .expect("stored");
    assert_eq!(stored.value.as_i64(), Some(42));
    assert_eq!(stored.type_code, 0);
}

#[tokio::test]
async fn plain_text_is_stored_verbatim() {
    let mut session = loaded("/content/blog").await;
    session.open_property_form();

    session
        .submit_property(PropertyForm::new("greeting", "hello").with_type(1))
        .await
        .expect("create");

    let repo = session.repository();
    assert_eq!(
        repo.property_value("/content/blog", "greeting"),
        Some(PropertyValue::from("hello"))
    );
    assert_eq!(
        repo.properties("/content/blog").unwrap()["greeting"].type_code,
        1
    );
}

#[tokio::test]
async fn successful_create_reloads_before_notifying() {
    let mut session = loaded("/content/blog").await;
    session.open_property_form();

    session
        .submit_property(PropertyForm::new("tags", r#"["a", "b"]"#))
        .await
        .expect("create");

    // One find for the initial load, one forced reload.
    assert_eq!(session.repository().calls().find, 2);
    assert!(displayed_names(&session).contains(&"tags".to_string()));
    assert_eq!(session.property_form(), &PropertyForm::default());
    assert!(!session.is_pending());
    assert_eq!(session.notifier().successes(), vec![statics::EN_PROPERTY_CREATED]);
}

#[tokio::test]
async fn failed_reload_after_create_suppresses_the_success_message() {
    let mut session = loaded("/content/blog").await;
    session.open_property_form();
    session.repository().fail_next(
        Operation::Find,
        RepositoryError::Transport("connection reset".to_string()),
    );

    let err = session
        .submit_property(PropertyForm::new("n", "1"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        SessionError::Repository(RepositoryError::Transport("connection reset".to_string()))
    );
    // The create itself committed.
    assert!(session.repository().property_value("/content/blog", "n").is_some());
    assert!(session.notifier().successes().is_empty());
    assert_eq!(
        session.notifier().errors(),
        vec!["Repository unreachable: connection reset"]
    );
    assert!(!displayed_names(&session).contains(&"n".to_string()));
}

#[tokio::test]
async fn failed_create_keeps_the_form_with_editable_text() {
    let mut session = loaded("/content/blog").await;
    session.open_property_form();

    for (typed, shown) in [("hello", "\"hello\""), (r#"{ "a": 1 }"#, r#"{"a":1}"#)] {
        session.repository().fail_next(
            Operation::CreateProperty,
            RepositoryError::Rejected {
                status: 400,
                message: "Invalid property".to_string(),
            },
        );

        let err = session
            .submit_property(PropertyForm::new("n", typed))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Repository(_)));
        assert_eq!(session.edit_state(), EditState::PropertyPending);
        let form = session.property_form();
        assert_eq!(form.name.as_deref(), Some("n"));
        assert_eq!(form.value.as_deref(), Some(shown));
        assert_eq!(form.type_code, Some(0));
    }

    assert_eq!(
        session.notifier().errors(),
        vec!["Invalid property", "Invalid property"]
    );
    assert_eq!(session.repository().calls().find, 1);
}

#[tokio::test]
async fn failed_create_leaves_the_form_pending_even_when_never_opened() {
    let mut session = loaded("/content/blog").await;
    assert!(session.open_rename_form());
    session.repository().fail_next(
        Operation::CreateProperty,
        RepositoryError::Transport("timeout".to_string()),
    );

    let _ = session.submit_property(PropertyForm::new("n", "7")).await;

    assert_eq!(session.edit_state(), EditState::PropertyPending);
    assert!(session.is_pending());
    assert!(session.property_form_displayed());
    assert!(!session.rename_form_displayed());
    assert_eq!(session.property_form().value.as_deref(), Some("7"));
}

#[tokio::test]
async fn resubmitting_the_recovered_text_stores_the_same_value() {
    let mut session = loaded("/content/blog").await;
    session.open_property_form();
    session.repository().fail_next(
        Operation::CreateProperty,
        RepositoryError::Transport("timeout".to_string()),
    );

    let _ = session.submit_property(PropertyForm::new("n", "hello")).await;
    let recovered = session.property_form().clone();
    session.submit_property(recovered).await.expect("retry");

    assert_eq!(
        session.repository().property_value("/content/blog", "n"),
        Some(PropertyValue::from("hello"))
    );
}

#[tokio::test]
async fn remove_reloads_then_notifies() {
    let mut session = loaded("/content/blog").await;

    session.remove_property("count").await.expect("remove");

    assert_eq!(displayed_names(&session), vec!["title", "published"]);
    assert_eq!(session.repository().calls().find, 2);
    assert_eq!(session.notifier().successes(), vec![statics::EN_PROPERTY_REMOVED]);
}

#[tokio::test]
async fn remove_failure_only_notifies() {
    let mut session = loaded("/content/blog").await;

    let err = session.remove_property("nope").await.unwrap_err();

    assert_eq!(
        err,
        SessionError::Repository(RepositoryError::PropertyNotFound {
            name: "nope".to_string()
        })
    );
    assert_eq!(session.notifier().errors(), vec!["Property not found: nope"]);
    assert_eq!(session.edit_state(), EditState::Idle);
    assert_eq!(session.repository().calls().find, 1);
}

#[tokio::test]
async fn dropping_a_property_on_the_trash_removes_it() {
    let mut session = loaded("/content/blog").await;
    let property = DraggableData {
        property: Some("title".to_string()),
    };
    let nothing = DraggableData::default();
    let trash = DroppableData { trash: true };
    let elsewhere = DroppableData::default();

    assert!(!session.on_element_dropped(&nothing, &trash).await.unwrap());
    assert!(!session.on_element_dropped(&property, &elsewhere).await.unwrap());
    assert_eq!(session.repository().calls().remove_property, 0);

    assert!(session.on_element_dropped(&property, &trash).await.unwrap());
    assert_eq!(displayed_names(&session), vec!["count", "published"]);
}

#[tokio::test]
async fn property_name_validity() {
    let mut session = loaded("/content/blog").await;
    session.open_property_form();
    session.property_form_mut().name = Some("title".to_string());

    let untouched = FieldState::default();
    let dirty = FieldState {
        dirty: true,
        required_error: false,
    };
    let blank = FieldState {
        dirty: true,
        required_error: true,
    };

    assert!(session.is_property_name_valid(untouched));
    assert!(!session.is_property_name_valid(dirty));
    assert!(!session.is_property_name_valid(blank));

    session.property_form_mut().name = Some("subtitle".to_string());
    assert!(session.is_property_name_valid(dirty));
    assert!(!session.is_property_name_valid(blank));

    assert!(session.is_property_value_valid(untouched));
    assert!(session.is_property_value_valid(dirty));
    assert!(!session.is_property_value_valid(blank));
}

#[tokio::test]
async fn refresh_bypasses_the_cache() {
    let mut session = loaded("/content/blog").await;
    let mut extra = session.repository().properties("/content/blog").unwrap();
    extra.insert(
        "external".to_string(),
        nodedit::Property::new(PropertyValue::from(true), 6),
    );
    session.repository().insert_node("/content/blog", extra);

    session
        .load(identity("/content/blog"), true)
        .await
        .expect("cached load");
    assert!(!displayed_names(&session).contains(&"external".to_string()));

    session.refresh().await.expect("refresh");
    assert!(displayed_names(&session).contains(&"external".to_string()));
}

#[tokio::test]
async fn destroy_is_idempotent_and_releases_the_subscription() {
    common::init_logging();
    let cancelled = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&cancelled);
    let mut session = session(repository()).with_search_subscription(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    session
        .load(identity("/content/blog"), true)
        .await
        .expect("load");

    session.destroy();
    session.destroy();

    assert_eq!(cancelled.load(Ordering::SeqCst), 1);
    assert!(session.is_destroyed());
    assert!(session.node().is_none());
    assert!(session.properties().is_empty());
    assert_eq!(session.phase(), SessionPhase::Empty);

    let err = session
        .load(identity("/content/blog"), true)
        .await
        .unwrap_err();
    assert_eq!(err, SessionError::Destroyed);
    assert_eq!(
        session.remove_property("title").await.unwrap_err(),
        SessionError::Destroyed
    );
}

#[tokio::test]
async fn log_notifier_drives_a_session() {
    common::init_logging();
    let mut session = NodeSession::new(repository(), SubsequenceMatcher, LogNotifier);
    session
        .load(identity("/content/blog"), true)
        .await
        .expect("load");

    session.remove_property("count").await.expect("remove");
    let err = session.remove_property("count").await.unwrap_err();

    assert_eq!(
        err,
        SessionError::Repository(RepositoryError::PropertyNotFound {
            name: "count".to_string()
        })
    );
    assert_eq!(session.properties().len(), 2);
}
