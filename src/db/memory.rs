// [business] In-process worker store - same contract as the Postgres store, backed by a Mutex
// Used by unit and router tests, and by anyone running the API without a database
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex, MutexGuard,
};

use anyhow::anyhow;
use async_trait::async_trait;

use super::{models::*, WorkerStore, WorkerUpdate};
use crate::error::AppError;

#[derive(Debug, Default)]
struct Tables {
    workers: Vec<Worker>,
    scales: Vec<(i32, i32, ScaleRecord)>, // (subsidiarie_id, worker_id, row)
    courses: Vec<WorkerCourse>,
}

#[derive(Debug, Default)]
pub struct MemoryWorkerStore {
    tables: Mutex<Tables>,
    update_calls: AtomicUsize,
}

impl MemoryWorkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    // [rust] A poisoned lock means a panic mid-write; surface it instead of unwrapping
    fn lock(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal(anyhow!("worker store lock poisoned")))
    }

    /// Seeds a worker row, replacing any existing row with the same id.
    pub fn insert_worker(&self, worker: Worker) -> Result<(), AppError> {
        let mut tables = self.lock()?;
        tables.workers.retain(|w| w.id != worker.id);
        tables.workers.push(worker);
        Ok(())
    }

    pub fn insert_scale(
        &self,
        subsidiarie_id: i32,
        worker_id: i32,
        scale: ScaleRecord,
    ) -> Result<(), AppError> {
        self.lock()?.scales.push((subsidiarie_id, worker_id, scale));
        Ok(())
    }

    /// Number of field updates that reached the store.
    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn worker(&self, id: i32) -> Option<Worker> {
        self.lock()
            .ok()
            .and_then(|tables| tables.workers.iter().find(|w| w.id == id).cloned())
    }
}

#[async_trait]
impl WorkerStore for MemoryWorkerStore {
    async fn find_active_worker_by_login(&self, login: &str) -> Result<Option<Worker>, AppError> {
        let tables = self.lock()?;
        Ok(tables
            .workers
            .iter()
            .find(|w| w.app_login == login && w.is_active)
            .cloned())
    }

    async fn find_active_worker_by_personal_id(
        &self,
        cpf: &str,
    ) -> Result<Option<Worker>, AppError> {
        let tables = self.lock()?;
        Ok(tables
            .workers
            .iter()
            .find(|w| w.cpf == cpf && w.is_active)
            .cloned())
    }

    async fn find_worker_by_id(&self, id: i32) -> Result<Option<Worker>, AppError> {
        let tables = self.lock()?;
        Ok(tables.workers.iter().find(|w| w.id == id).cloned())
    }

    async fn update_worker_fields(
        &self,
        id: i32,
        update: &WorkerUpdate,
    ) -> Result<Worker, AppError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);

        let mut tables = self.lock()?;
        let worker = tables
            .workers
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| AppError::not_found("Worker not found"))?;

        // All fields are applied under one lock, matching the single UPDATE statement
        update.apply(worker);
        Ok(worker.clone())
    }

    async fn update_worker_password(&self, cpf: &str, password_hash: &str) -> Result<(), AppError> {
        let mut tables = self.lock()?;
        for worker in tables.workers.iter_mut().filter(|w| w.cpf == cpf) {
            worker.app_password = password_hash.to_string();
        }
        Ok(())
    }

    async fn find_scale(
        &self,
        subsidiarie_id: i32,
        worker_id: i32,
    ) -> Result<Option<ScaleRecord>, AppError> {
        let tables = self.lock()?;
        Ok(tables
            .scales
            .iter()
            .find(|(s, w, _)| *s == subsidiarie_id && *w == worker_id)
            .map(|(_, _, scale)| scale.clone()))
    }

    async fn list_worker_courses(&self, worker_id: i32) -> Result<Vec<WorkerCourse>, AppError> {
        let tables = self.lock()?;
        Ok(tables
            .courses
            .iter()
            .filter(|c| c.worker_id == worker_id)
            .cloned()
            .collect())
    }

    async fn find_course_file(&self, course_id: i32) -> Result<Option<Vec<u8>>, AppError> {
        let tables = self.lock()?;
        Ok(tables
            .courses
            .iter()
            .find(|c| c.id == course_id)
            .and_then(|c| c.file.clone()))
    }

    async fn insert_worker_course(&self, course: NewWorkerCourse) -> Result<(), AppError> {
        let mut tables = self.lock()?;
        let id = tables.courses.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        tables.courses.push(WorkerCourse {
            id,
            worker_id: course.worker_id,
            file: Some(course.file),
            date_file: course.date_file,
            is_payed: course.is_payed,
        });
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.lock().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::WorkerField;

    fn worker(id: i32, login: &str, active: bool) -> Worker {
        Worker {
            id,
            name: format!("Worker {}", id),
            cpf: format!("0000000000{}", id),
            app_login: login.to_string(),
            app_password: "hash".to_string(),
            is_active: active,
            subsidiarie_id: Some(1),
            email: Some("old@example.com".to_string()),
            phone: None,
            mobile_phone: None,
            street: None,
            street_number: None,
            neighborhood: None,
            city: None,
            state: None,
            cep: None,
        }
    }

    #[tokio::test]
    async fn test_inactive_workers_are_invisible_to_login_lookups() {
        let store = MemoryWorkerStore::new();
        store.insert_worker(worker(1, "ana", false)).unwrap();

        assert!(store.find_active_worker_by_login("ana").await.unwrap().is_none());
        assert!(store
            .find_active_worker_by_personal_id("00000000001")
            .await
            .unwrap()
            .is_none());
        assert!(store.find_worker_by_id(1).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_applies_only_named_fields() {
        let store = MemoryWorkerStore::new();
        store.insert_worker(worker(3, "bia", true)).unwrap();

        let update = WorkerUpdate::new().set(WorkerField::City, Some("Natal".to_string()));
        let updated = store.update_worker_fields(3, &update).await.unwrap();

        assert_eq!(updated.city.as_deref(), Some("Natal"));
        assert_eq!(updated.email.as_deref(), Some("old@example.com"));
        assert_eq!(store.update_calls(), 1);
    }

    #[tokio::test]
    async fn test_course_ids_are_assigned_in_order() {
        let store = MemoryWorkerStore::new();
        for date in ["2024-01-01", "2024-02-01"] {
            store
                .insert_worker_course(NewWorkerCourse {
                    worker_id: 5,
                    file: b"%PDF-1.4".to_vec(),
                    date_file: date.to_string(),
                    is_payed: false,
                })
                .await
                .unwrap();
        }

        let courses = store.list_worker_courses(5).await.unwrap();
        assert_eq!(courses.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(store.find_course_file(2).await.unwrap().unwrap(), b"%PDF-1.4");
        assert!(store.find_course_file(3).await.unwrap().is_none());
    }
}
