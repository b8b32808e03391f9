#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{auth_provider, descriptors, InlineProvider};
use schemagen_core::config::GeneratorConfig;
use schemagen_core::errors::ExErrorKind;
use schemagen_core::logging_facility::test_capture::init_test_capture;
use schemagen_core::model::{EntityFields, EntitySnapshot, ExtensionDescriptor, FieldAttribute};
use schemagen_core_types::schema::{EVENT_END_ERROR, FIELD_ERR_CODE, FIELD_RUN_ID};
use schemagen_engine::{generate_types, GenerationRun, RunState};

#[test]
fn test_extension_failure_aborts_run_with_extension_id() {
    // Scenario: provider throws for one extension
    // Given: [admin, broken, jwt]
    // When: generating
    // Then: SnapshotFailure naming "broken", jwt never requested, no artifact

    let provider = auth_provider();
    let extensions = descriptors(&["admin", "broken", "jwt"]);
    let config = GeneratorConfig::default();
    let mut run = GenerationRun::new(&provider, &extensions, &config);

    let err = run.execute().unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::SnapshotFailure);
    assert_eq!(err.code(), "ERR_SNAPSHOT_FAILURE");
    assert_eq!(err.extension_id(), Some("broken"));
    assert_eq!(err.run_id(), Some(run.run_id()));
    assert!(err.message().contains("resolver crashed"));
    assert_eq!(run.state(), RunState::Failed);

    let calls = provider.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[2], vec!["broken".to_string()]);
}

#[test]
fn test_unknown_extension_is_snapshot_failure() {
    let provider = auth_provider();
    let err = generate_types(
        &provider,
        &descriptors(&["not-installed"]),
        &GeneratorConfig::default(),
    )
    .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::SnapshotFailure);
    assert_eq!(err.extension_id(), Some("not-installed"));
}

#[test]
fn test_base_failure_has_no_extension_id() {
    let provider = InlineProvider::failing_base();
    let extensions = vec![ExtensionDescriptor::new("admin", EntitySnapshot::new())];

    let err = generate_types(&provider, &extensions, &GeneratorConfig::default()).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::SnapshotFailure);
    assert_eq!(err.op(), Some("snapshot_base"));
    assert_eq!(err.extension_id(), None);
    assert!(err.message().contains("base schema unavailable"));
    assert_eq!(provider.calls().len(), 1);
}

#[test]
fn test_failure_is_logged_with_error_code() {
    let capture = init_test_capture();
    let provider = InlineProvider::failing_base();
    let extensions: Vec<ExtensionDescriptor<EntitySnapshot>> = vec![];
    let config = GeneratorConfig::default();
    let mut run = GenerationRun::new(&provider, &extensions, &config);

    let err = run.execute().unwrap_err();

    let failed = capture.count_events(|e| {
        e.op.as_deref() == Some("generate_types")
            && e.event.as_deref() == Some(EVENT_END_ERROR)
            && e.field(FIELD_ERR_CODE) == Some("ERR_SNAPSHOT_FAILURE")
            && e.field(FIELD_RUN_ID) == Some(run.run_id().as_str())
    });
    assert_eq!(failed, 1);
    capture.assert_event_exists("snapshot_base", EVENT_END_ERROR);
    assert_eq!(err.run_id(), Some(run.run_id()));
}

#[test]
fn test_inline_activation_payload_reaches_provider() {
    let base = EntitySnapshot::new().with_entity(
        "user",
        EntityFields::new().with_field("email", FieldAttribute::string().required()),
    );
    let provider = InlineProvider::new(base);
    let extensions = vec![ExtensionDescriptor::new(
        "admin",
        EntitySnapshot::new().with_entity(
            "user",
            EntityFields::new().with_field("banned", FieldAttribute::boolean()),
        ),
    )];

    let artifact = generate_types(&provider, &extensions, &GeneratorConfig::default()).unwrap();

    assert!(artifact
        .text
        .contains(r#"export type User = UserBaseFields & UserPluginFields["admin"];"#));
    assert_eq!(
        provider.calls(),
        vec![Vec::<String>::new(), vec!["admin".to_string()]]
    );
}
