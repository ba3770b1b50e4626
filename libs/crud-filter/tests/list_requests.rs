#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end compilation of wire-shaped list requests.

use std::sync::Arc;

use crud_filter::{
    CompareOp, DatePart, FilterCompiler, FilterConfig, FilterError, Filterable, ListRequest,
    Predicate, ResourceSchema, ResourceType, SchemaProvider,
};
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

struct Registry;

impl SchemaProvider for Registry {
    fn resource(&self, name: &str) -> Option<ResourceType> {
        match name {
            "attendances" => Some(ResourceType::filterable::<Attendance>()),
            "device_tokens" => Some(ResourceType::plain("device_tokens")),
            _ => None,
        }
    }
}

fn compiler() -> FilterCompiler {
    FilterCompiler::new(Arc::new(Registry), FilterConfig::default())
}

#[test]
fn query_string_shaped_request() {
    let request: ListRequest = serde_json::from_value(json!({
        "filter": r#"{"status":"present,late","time_in":{"function":"month","value":"04"},"schedules.schedule_id":{"operator":"=","value":"01gy9d4r"},"search":"ann"}"#,
        "sort": "time_in",
        "order": "ASC",
        "limit": "10",
        "page": "2"
    }))
    .unwrap();

    let plan = compiler().compile("attendances", &request).unwrap();

    assert_eq!(
        plan.predicates,
        vec![
            Predicate::r#in("status", ["present", "late"]),
            Predicate::DatePart {
                column: "time_in".to_owned(),
                part: DatePart::Month,
                op: CompareOp::Eq,
                value: "04".to_owned(),
            },
            Predicate::related("schedules", Predicate::eq("schedule_id", "01gy9d4r")),
            Predicate::contains("employee_name", "ann"),
        ]
    );
    let sort = plan.sort.as_ref().unwrap();
    assert_eq!(sort.column, "time_in");
    assert_eq!(sort.order, "asc");
    assert_eq!(plan.page_size, 10);
    assert_eq!(plan.page, 2);
}

#[test]
fn plan_serializes_for_diagnostics() {
    let request = ListRequest::with_filter(json!({"id": "20,22,24"}));
    let plan = compiler().compile("attendances", &request).unwrap();
    let value = serde_json::to_value(&plan).unwrap();
    assert_eq!(
        value["predicates"][0],
        json!({"kind": "in", "column": "id", "values": ["20", "22", "24"]})
    );
}

#[test]
fn non_filterable_resource_fails_before_parsing() {
    let request = ListRequest::with_filter(json!("{broken"));
    let err = compiler().compile("device_tokens", &request).unwrap_err();
    assert!(matches!(err, FilterError::Schema { .. }));
}

#[test]
fn unknown_keys_never_fail() {
    let request = ListRequest::with_filter(json!({
        "does_not_exist": "1",
        "also.not.real": {"operator": "=", "value": "2"},
        "time_in": {"function": "sideways", "value": "3"}
    }));
    let plan = compiler().compile("attendances", &request).unwrap();
    // relation keys are not validated by the compiler
    assert_eq!(
        plan.predicates,
        vec![Predicate::related("also.not", Predicate::eq("real", "2"))]
    );
}
