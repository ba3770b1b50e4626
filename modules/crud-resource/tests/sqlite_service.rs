#![allow(clippy::unwrap_used, clippy::expect_used)]
#![cfg(feature = "sqlite")]

//! `CrudService` over `SQLite` through `SeaQueryExecutor`.

use std::sync::Arc;

use crud_filter::{Filterable, ListRequest, ResourceSchema};
use crud_filter_db::{RelationLink, SeaQueryExecutor, TableBinding};
use crud_resource::{CrudConfig, DomainError, ResourceRegistry, SqlCrudService};
use sea_orm::{ConnectOptions, ConnectionTrait, Database};
use serde_json::json;

struct Attendance;

impl Filterable for Attendance {
    const RESOURCE: &'static str = "attendances";
    const SCHEMA: ResourceSchema = ResourceSchema {
        columns: &["id", "employee_name", "status", "time_in", "created_at"],
        primary_key: "id",
        searchable: &["employee_name"],
    };
}

const ATTENDANCES: TableBinding = TableBinding::new("attendances", Attendance::SCHEMA)
    .with_relations(&[RelationLink {
        path: "schedules",
        table: "attendance_schedules",
        local_key: "id",
        foreign_key: "attendance_id",
    }]);

async fn service() -> SqlCrudService {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await.expect("connect");
    db.execute_unprepared(
        "CREATE TABLE attendances (
            id TEXT PRIMARY KEY NOT NULL,
            employee_name TEXT NOT NULL,
            status TEXT NOT NULL,
            time_in TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE TABLE attendance_schedules (
            attendance_id TEXT NOT NULL,
            schedule_id TEXT NOT NULL
        );
        INSERT INTO attendances VALUES
            ('a1', 'Ann Lee', 'present', '2024-04-01 08:55:00', '2024-04-01 08:55:00'),
            ('a2', 'Bob Ray', 'late', '2024-04-02 09:20:00', '2024-04-02 09:20:00'),
            ('a3', 'Annette Ko', 'absent', '2024-05-03 00:00:00', '2024-05-03 00:00:00');
        INSERT INTO attendance_schedules VALUES
            ('a1', '01gy9d4r'),
            ('a2', '01gy9d4r'),
            ('a3', '02hz0e5s');",
    )
    .await
    .expect("schema");

    let registry = ResourceRegistry::builder()
        .filterable::<Attendance>()
        .build()
        .unwrap();
    let executor = SeaQueryExecutor::new(db).with_table(Attendance::RESOURCE, ATTENDANCES);
    SqlCrudService::new(Arc::new(registry), Arc::new(executor), CrudConfig::default())
}

fn ids(page: &crud_filter::Page<crud_filter::Row>) -> Vec<&str> {
    page.items.iter().map(|r| r["id"].as_str().unwrap()).collect()
}

#[tokio::test]
async fn attendance_list_with_every_term_shape() {
    let service = service().await;
    let request: ListRequest = serde_json::from_value(json!({
        "filter": r#"{"status":"present,late","time_in":{"function":"month","value":"04"},"schedules.schedule_id":{"operator":"=","value":"01gy9d4r"},"search":"ann"}"#,
        "sort": "time_in",
        "order": "ASC"
    }))
    .unwrap();

    let page = service.list("attendances", &request).await.unwrap();
    assert_eq!(ids(&page), vec!["a1"]);
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn search_alone_matches_substrings() {
    let service = service().await;
    let request: ListRequest = serde_json::from_value(json!({
        "filter": {"search": "ANN"},
        "sort": "time_in",
        "order": "asc"
    }))
    .unwrap();

    let page = service.list("attendances", &request).await.unwrap();
    assert_eq!(ids(&page), vec!["a1", "a3"]);
}

#[tokio::test]
async fn record_round_trip_through_service() {
    let service = service().await;
    let payload = json!({
        "id": "a4",
        "employee_name": "Cy Dee",
        "status": "present",
        "time_in": "2024-06-01 09:00:00",
        "created_at": "2024-06-01 09:00:00",
        "device": "kiosk-3"
    });

    let created = service
        .create("attendances", payload.as_object().cloned().unwrap())
        .await
        .unwrap();
    assert_eq!(created["employee_name"], "Cy Dee");

    let changes = json!({"status": "late"}).as_object().cloned().unwrap();
    let updated = service.update("attendances", "a4", changes).await.unwrap();
    assert_eq!(updated["status"], "late");

    service.delete("attendances", "a4").await.unwrap();
    assert!(matches!(
        service.get("attendances", "a4").await.unwrap_err(),
        DomainError::NotFound { .. }
    ));
}

struct Tag;

impl Filterable for Tag {
    const RESOURCE: &'static str = "tags";
    const SCHEMA: ResourceSchema = ResourceSchema {
        columns: &["id", "label", "search"],
        primary_key: "id",
        searchable: &["label"],
    };
}

#[tokio::test]
async fn resource_without_created_at_lists_unsorted() {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await.expect("connect");
    db.execute_unprepared(
        "CREATE TABLE tags (
            id TEXT PRIMARY KEY NOT NULL,
            label TEXT NOT NULL,
            search TEXT NOT NULL
        );
        INSERT INTO tags VALUES ('t1', 'rust', 'rust'), ('t2', 'rusty', 'x');",
    )
    .await
    .expect("schema");

    let registry = ResourceRegistry::builder().filterable::<Tag>().build().unwrap();
    let executor = SeaQueryExecutor::new(db)
        .with_table(Tag::RESOURCE, TableBinding::new("tags", Tag::SCHEMA));
    let service = SqlCrudService::new(Arc::new(registry), Arc::new(executor), CrudConfig::default());

    let page = service.list("tags", &ListRequest::default()).await.unwrap();
    assert_eq!(page.total, 2);

    // The `search` column gets an equality match on top of the label search.
    let page = service
        .list("tags", &ListRequest::with_filter(json!({"search": "rust"})))
        .await
        .unwrap();
    assert_eq!(ids(&page), vec!["t1"]);
}
