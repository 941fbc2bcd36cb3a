//! Tests for VersionService and the tag commands

mod common;

use std::sync::Arc;

use hubadmin::cli::commands::run;
use hubadmin::cli::Commands;
use hubadmin::exitcode;

use common::{container, refs, Call, FakeHub, ScriptedConfirmer, REPO};

#[test]
fn given_refs_when_list_versions_then_returns_branches_and_tags_in_hub_order() {
    // Arrange
    let hub = Arc::new(FakeHub {
        refs: refs(&["main", "dev"], &["v2.0", "v1.0"]),
        ..Default::default()
    });
    let confirmer = Arc::new(ScriptedConfirmer::default());
    let c = container(&hub, &confirmer);

    // Act
    let listed = c.versions.list_versions().unwrap();

    // Assert
    assert_eq!(listed.branch_names().collect::<Vec<_>>(), vec!["main", "dev"]);
    assert_eq!(listed.tag_names().collect::<Vec<_>>(), vec!["v2.0", "v1.0"]);
}

#[test]
fn given_list_versions_command_when_run_then_queries_configured_repo() {
    let hub = Arc::new(FakeHub::default());
    let confirmer = Arc::new(ScriptedConfirmer::default());
    let c = container(&hub, &confirmer);

    run(&Commands::ListVersions, &c).unwrap();

    assert_eq!(hub.calls(), vec![Call::ListRefs(REPO.to_string())]);
}

#[test]
fn given_new_tag_when_create_tag_then_tags_main_without_prompt() {
    let hub = Arc::new(FakeHub::default());
    let confirmer = Arc::new(ScriptedConfirmer::default());
    let c = container(&hub, &confirmer);

    run(
        &Commands::CreateTag {
            name: "v1.0".into(),
            message: "first release".into(),
        },
        &c,
    )
    .unwrap();

    assert!(confirmer.questions().is_empty());
    assert_eq!(
        hub.calls(),
        vec![Call::CreateTag {
            repo: REPO.to_string(),
            tag: "v1.0".into(),
            message: "first release".into(),
            revision: "main".into(),
        }]
    );
}

#[test]
fn given_existing_tag_when_create_tag_then_fails_with_hub_error() {
    let hub = Arc::new(FakeHub {
        refs: refs(&["main"], &["v1.0"]),
        ..Default::default()
    });
    let confirmer = Arc::new(ScriptedConfirmer::default());
    let c = container(&hub, &confirmer);

    let err = run(
        &Commands::CreateTag {
            name: "v1.0".into(),
            message: "again".into(),
        },
        &c,
    )
    .unwrap_err();

    assert_eq!(err.exit_code(), exitcode::UNAVAILABLE);
    assert!(err.to_string().contains("v1.0"));
}

#[test]
fn given_declined_confirmation_when_delete_tag_then_no_hub_call() {
    let hub = Arc::new(FakeHub::default());
    let confirmer = Arc::new(ScriptedConfirmer::answering(&[false]));
    let c = container(&hub, &confirmer);

    run(&Commands::DeleteTag { name: "v1.0".into() }, &c).unwrap();

    assert_eq!(confirmer.questions(), vec!["Delete tag 'v1.0'?"]);
    assert!(hub.calls().is_empty());
}

#[test]
fn given_confirmation_when_delete_tag_then_deletes_exactly_once() {
    let hub = Arc::new(FakeHub::default());
    let confirmer = Arc::new(ScriptedConfirmer::answering(&[true]));
    let c = container(&hub, &confirmer);

    run(&Commands::DeleteTag { name: "v1.0".into() }, &c).unwrap();

    assert_eq!(
        hub.calls(),
        vec![Call::DeleteTag {
            repo: REPO.to_string(),
            tag: "v1.0".into(),
        }]
    );
}
