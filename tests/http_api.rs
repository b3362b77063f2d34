//! End-to-end tests against a running service.

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{json, Value};

use form_config::cache::source::write_snapshot;
use form_config::cache::{ConfigEvents, ConfigSource, SnapshotSource};
use form_config::editor::{ConfigEditor, EditorState};
use form_config::form::{normalize, ConfigDocument, DefaultRegistry, FormName};
use form_config::store::{ConfigStore, StoreError};

mod common;

fn asset_form() -> FormName {
    FormName::from_static("AssetForm")
}

fn resolved_names(body: &Value) -> Vec<String> {
    body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_absent_form_reads_as_none() {
    let service = common::start_service().await;
    let store = service.client_store();

    assert_eq!(store.get(&asset_form()).await.unwrap(), None);

    let res = reqwest::get(format!("{}/form-config/AssetForm", service.url()))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(res.headers().contains_key("x-request-id"));

    service.stop().await;
}

#[tokio::test]
async fn test_put_then_get_returns_document() {
    let service = common::start_service().await;
    let store = service.client_store();
    let document = ConfigDocument::parse(json!({
        "fields": [{"name": "serialNumber", "order": 0}, {"name": "name", "order": 1}],
        "layout": "two-column"
    }))
    .unwrap();

    let first = store.put(&asset_form(), document.clone()).await.unwrap();
    assert_eq!(first.form_name, asset_form());
    assert_eq!(first.config, document);
    assert_eq!(store.get(&asset_form()).await.unwrap(), Some(document.clone()));

    let replacement = ConfigDocument::parse(json!({"fields": []})).unwrap();
    let second = store.put(&asset_form(), replacement.clone()).await.unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(store.get(&asset_form()).await.unwrap(), Some(replacement));
    assert_eq!(service.store.len(), 1);

    service.stop().await;
}

#[tokio::test]
async fn test_query_parameters_are_ignored() {
    let service = common::start_service().await;
    let document = json!({"fields": [{"name": "amount", "order": 0}]});
    let client = reqwest::Client::new();
    client
        .post(format!("{}/form-config/ExpenseForm", service.url()))
        .json(&document)
        .send()
        .await
        .unwrap()
        .error_for_status()
        .unwrap();

    let res = client
        .get(format!("{}/form-config/ExpenseForm?_ts=1700000000000&x=y", service.url()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["cache-control"], "no-store");
    assert_eq!(res.json::<Value>().await.unwrap(), document);

    service.stop().await;
}

#[tokio::test]
async fn test_invalid_writes_are_rejected() {
    let service = common::start_service().await;
    let client = reqwest::Client::new();

    for body in ["{\"fields\": {}}", "42", "{oops"] {
        let res = client
            .post(format!("{}/form-config/AssetForm", service.url()))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "body {body}");
    }

    let res = client
        .post(format!("{}/form-config/bad%20name", service.url()))
        .json(&json!({"fields": []}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let error: Value = res.json().await.unwrap();
    assert!(error["error"].as_str().unwrap().contains("Invalid form name"));

    assert!(service.store.is_empty());
    service.stop().await;
}

#[tokio::test]
async fn test_list_returns_every_form() {
    let service = common::start_service().await;
    let store = service.client_store();
    for form in ["AssetForm", "MainLayout"] {
        store
            .put(
                &FormName::new(form).unwrap(),
                ConfigDocument::parse(json!({"fields": []})).unwrap(),
            )
            .await
            .unwrap();
    }

    let all = store.list().await.unwrap();
    assert_eq!(
        all.keys().map(FormName::as_str).collect::<Vec<_>>(),
        vec!["AssetForm", "MainLayout"]
    );

    service.stop().await;
}

#[tokio::test]
async fn test_resolved_view_follows_saved_configuration() {
    let service = common::start_service().await;
    let store = service.client_store();

    let before = store.resolved(&asset_form()).await.unwrap();
    assert_eq!(resolved_names(&before)[0], "name");
    assert!(service.cache.is_loaded());

    store
        .put(
            &asset_form(),
            ConfigDocument::parse(json!({"fields": [{"name": "notes", "order": 0}]})).unwrap(),
        )
        .await
        .unwrap();

    let body = store.resolved(&asset_form()).await.unwrap();
    let names = resolved_names(&body);
    assert_eq!(names[0], "notes");
    assert_eq!(names.len(), 10);
    assert_eq!(names[1], "name");

    service.stop().await;
}

#[tokio::test]
async fn test_editor_saves_through_remote_store() {
    let service = common::start_service().await;
    let store = Arc::new(service.client_store());
    let registry = DefaultRegistry::builtin().unwrap();
    let defaults = registry.get(&asset_form()).unwrap();

    let mut editor = ConfigEditor::new(store.clone(), ConfigEvents::default());
    editor.open(defaults, None).unwrap();
    editor.move_down(0).unwrap();
    editor.move_down(1).unwrap();
    editor.save().await.unwrap();
    assert!(matches!(editor.state(), EditorState::Closed));

    let saved = store.get(&asset_form()).await.unwrap().unwrap();
    let config = normalize(&asset_form(), &saved).unwrap();
    let order: Vec<(&str, Option<i64>)> = config
        .fields
        .iter()
        .map(|f| (f.name.as_str(), f.order))
        .collect();
    assert_eq!(&order[..3], &[
        ("serialNumber", Some(0)),
        ("type", Some(1)),
        ("name", Some(2)),
    ]);
    assert_eq!(order.len(), 10);

    // Reopening from the saved document shows the saved order.
    editor.open(defaults, Some(&config)).unwrap();
    let names: Vec<&str> = editor
        .entries()
        .unwrap()
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(&names[..3], &["serialNumber", "type", "name"]);

    service.stop().await;
}

#[tokio::test]
async fn test_failed_save_keeps_session() {
    let service = common::start_service().await;
    let store = Arc::new(service.client_store());
    service.stop().await;

    let registry = DefaultRegistry::builtin().unwrap();
    let mut editor = ConfigEditor::new(store, ConfigEvents::default());
    editor.open(registry.get(&asset_form()).unwrap(), None).unwrap();
    editor.move_up(1).unwrap();

    let err = editor.save().await.unwrap_err();
    assert!(err.to_string().starts_with("Failed to save configuration"));
    assert!(editor.last_error().is_some());
    assert_eq!(editor.entries().unwrap()[0].name, "serialNumber");

    // Still editable after the failure.
    editor.move_down(0).unwrap();
    assert!(matches!(editor.state(), EditorState::Open(_)));
}

#[tokio::test]
async fn test_unreachable_service_is_a_transport_error() {
    let service = common::start_service().await;
    let store = service.client_store();
    service.stop().await;

    assert!(matches!(
        store.get(&asset_form()).await,
        Err(StoreError::Transport(_))
    ));
}

#[tokio::test]
async fn test_exported_snapshot_loads() {
    let service = common::start_service().await;
    let store = service.client_store();
    store
        .put(
            &FormName::from_static("MainLayout"),
            ConfigDocument::parse(json!({
                "fields": [{"name": "/settings", "order": 0, "label": "Admin"}]
            }))
            .unwrap(),
        )
        .await
        .unwrap();

    let path = std::env::temp_dir().join(format!("form-config-export-{}.json", uuid::Uuid::new_v4()));
    write_snapshot(&path, &store.list().await.unwrap()).await.unwrap();

    let set = SnapshotSource::file(&path).load().await.unwrap();
    let config = set.get(&FormName::from_static("MainLayout")).unwrap();
    assert_eq!(config.fields[0].label.as_deref(), Some("Admin"));

    std::fs::remove_file(&path).unwrap_or_default();
    service.stop().await;
}
