//! Partial updates of worker records.
//!
//! A client-supplied JSON object is turned into a [`WorkerUpdate`] only if
//! every key names a column on the allow-list and every value has the right
//! type. Column names in the generated SQL come exclusively from
//! [`WorkerField::column`]; values are always bound parameters.

use std::{fmt, str::FromStr};

use serde_json::{Map, Value};
use sqlx::{Postgres, QueryBuilder};

use super::models::{Worker, WORKER_COLUMNS};
use crate::error::AppError;

/// Worker columns a worker may change about themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerField {
    Name,
    Email,
    Phone,
    MobilePhone,
    Street,
    StreetNumber,
    Neighborhood,
    City,
    State,
    Cep,
}

impl WorkerField {
    pub const ALL: [WorkerField; 10] = [
        WorkerField::Name,
        WorkerField::Email,
        WorkerField::Phone,
        WorkerField::MobilePhone,
        WorkerField::Street,
        WorkerField::StreetNumber,
        WorkerField::Neighborhood,
        WorkerField::City,
        WorkerField::State,
        WorkerField::Cep,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            WorkerField::Name => "name",
            WorkerField::Email => "email",
            WorkerField::Phone => "phone",
            WorkerField::MobilePhone => "mobile_phone",
            WorkerField::Street => "street",
            WorkerField::StreetNumber => "street_number",
            WorkerField::Neighborhood => "neighborhood",
            WorkerField::City => "city",
            WorkerField::State => "state",
            WorkerField::Cep => "cep",
        }
    }

    pub fn is_nullable(&self) -> bool {
        !matches!(self, WorkerField::Name)
    }

    // Typed setter used by in-process stores
    fn set(&self, worker: &mut Worker, value: Option<String>) {
        match self {
            // from_json never lets a null through for `name`
            WorkerField::Name => worker.name = value.unwrap_or_default(),
            WorkerField::Email => worker.email = value,
            WorkerField::Phone => worker.phone = value,
            WorkerField::MobilePhone => worker.mobile_phone = value,
            WorkerField::Street => worker.street = value,
            WorkerField::StreetNumber => worker.street_number = value,
            WorkerField::Neighborhood => worker.neighborhood = value,
            WorkerField::City => worker.city = value,
            WorkerField::State => worker.state = value,
            WorkerField::Cep => worker.cep = value,
        }
    }
}

impl fmt::Display for WorkerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for WorkerField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkerField::ALL
            .into_iter()
            .find(|field| field.column() == s)
            .ok_or_else(|| AppError::Schema(format!("Field '{}' cannot be updated", s)))
    }
}

/// Validated set of field changes, in request order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkerUpdate {
    changes: Vec<(WorkerField, Option<String>)>,
}

impl WorkerUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter; a later value for the same field replaces the earlier one.
    pub fn set(mut self, field: WorkerField, value: Option<String>) -> Self {
        match self.changes.iter_mut().find(|(f, _)| *f == field) {
            Some(existing) => existing.1 = value,
            None => self.changes.push((field, value)),
        }
        self
    }

    pub fn from_json(body: &Map<String, Value>) -> Result<Self, AppError> {
        let mut update = WorkerUpdate::new();

        for (key, value) in body {
            let field: WorkerField = key.parse()?;

            let value = match value {
                Value::String(s) => Some(s.clone()),
                Value::Null if field.is_nullable() => None,
                Value::Null => {
                    return Err(AppError::Schema(format!("Field '{}' cannot be null", key)))
                }
                _ => {
                    return Err(AppError::Schema(format!(
                        "Field '{}' must be a string",
                        key
                    )))
                }
            };

            update = update.set(field, value);
        }

        Ok(update)
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn changes(&self) -> &[(WorkerField, Option<String>)] {
        &self.changes
    }

    pub fn apply(&self, worker: &mut Worker) {
        for (field, value) in &self.changes {
            field.set(worker, value.clone());
        }
    }
}

/// `UPDATE workers SET a = $1, b = $2 WHERE id = $3 RETURNING ...`
///
/// Callers must not pass an empty update; there would be nothing to SET.
pub fn build_update_query(worker_id: i32, update: &WorkerUpdate) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("UPDATE workers SET ");

    let mut assignments = builder.separated(", ");
    for (field, value) in update.changes() {
        assignments.push(field.column());
        assignments.push_unseparated(" = ");
        assignments.push_bind_unseparated(value.clone());
    }

    builder.push(" WHERE id = ");
    builder.push_bind(worker_id);
    builder.push(" RETURNING ");
    builder.push(WORKER_COLUMNS);

    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test body must be an object"),
        }
    }

    #[test]
    fn test_single_field_statement() {
        let update = WorkerUpdate::from_json(&body(json!({"name": "Ana"}))).unwrap();
        let query = build_update_query(42, &update);

        assert_eq!(
            query.sql(),
            format!("UPDATE workers SET name = $1 WHERE id = $2 RETURNING {}", WORKER_COLUMNS)
        );
    }

    #[test]
    fn test_worker_id_is_last_parameter() {
        let update = WorkerUpdate::new()
            .set(WorkerField::Email, Some("ana@example.com".into()))
            .set(WorkerField::City, None)
            .set(WorkerField::Cep, Some("01001-000".into()));
        let query = build_update_query(9, &update);

        assert!(query
            .sql()
            .starts_with("UPDATE workers SET email = $1, city = $2, cep = $3 WHERE id = $4 RETURNING "));
    }

    #[test]
    fn test_values_never_reach_sql_text() {
        let update = WorkerUpdate::from_json(&body(json!({
            "name": "'; DROP TABLE workers; --",
            "email": "x' OR '1'='1"
        })))
        .unwrap();
        let sql = build_update_query(1, &update).sql().to_string();

        assert!(!sql.contains("DROP"));
        assert!(!sql.contains("OR '1'"));
    }

    #[test]
    fn test_sensitive_and_unknown_fields_rejected() {
        for key in ["app_password", "cpf", "app_login", "is_active", "id", "salary", "name = 'x'--"] {
            let mut map = Map::new();
            map.insert(key.to_string(), json!("value"));

            assert!(
                matches!(WorkerUpdate::from_json(&map), Err(AppError::Schema(_))),
                "field {:?} should be rejected",
                key
            );
        }
    }

    #[test]
    fn test_value_types_checked() {
        assert!(matches!(
            WorkerUpdate::from_json(&body(json!({"phone": 123}))),
            Err(AppError::Schema(_))
        ));
        assert!(matches!(
            WorkerUpdate::from_json(&body(json!({"name": null}))),
            Err(AppError::Schema(_))
        ));

        let cleared = WorkerUpdate::from_json(&body(json!({"email": null}))).unwrap();
        assert_eq!(cleared.changes(), &[(WorkerField::Email, None)]);
    }

    #[test]
    fn test_empty_body_gives_empty_update() {
        let update = WorkerUpdate::from_json(&Map::new()).unwrap();
        assert!(update.is_empty());
        assert_eq!(update.len(), 0);
    }

    #[test]
    fn test_set_replaces_duplicate_field() {
        let update = WorkerUpdate::new()
            .set(WorkerField::Phone, Some("1".into()))
            .set(WorkerField::Phone, Some("2".into()));

        assert_eq!(update.changes(), &[(WorkerField::Phone, Some("2".to_string()))]);
    }

    #[test]
    fn test_every_field_round_trips_through_its_column_name() {
        for field in WorkerField::ALL {
            assert_eq!(field.column().parse::<WorkerField>().unwrap(), field);
        }
    }
}
