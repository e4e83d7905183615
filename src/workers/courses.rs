use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Json, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::info;

use crate::{
    auth::AuthenticatedWorker,
    db::{CourseSummary, MessageResponse, NewWorkerCourse, WorkerStore},
    error::AppError,
    web::PathParam,
};

const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const COURSE_SAVED: &str = "Course uploaded and saved successfully";

// Scanned certificates routinely exceed axum's 2 MiB default body limit
pub const MAX_COURSE_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Every course of a worker with its PDF inlined as base64.
pub async fn list_worker_courses(
    store: &dyn WorkerStore,
    worker_id: i32,
) -> Result<Vec<CourseSummary>, AppError> {
    let courses = store.list_worker_courses(worker_id).await?;

    if courses.is_empty() {
        return Err(AppError::not_found("No courses found"));
    }

    Ok(courses
        .into_iter()
        .map(|course| CourseSummary {
            id: course.id,
            worker_id: course.worker_id,
            date_file: course.date_file,
            is_payed: course.is_payed,
            file_base64: STANDARD.encode(course.file.unwrap_or_default()),
        })
        .collect())
}

/// GET /workers-courses/:worker_id
pub async fn list_courses_handler(
    auth: AuthenticatedWorker,
    State(store): State<Arc<dyn WorkerStore>>,
    PathParam(worker_id): PathParam<i32>,
) -> Result<Json<Vec<CourseSummary>>, AppError> {
    auth.ensure_owner(worker_id)?;

    Ok(Json(list_worker_courses(store.as_ref(), worker_id).await?))
}

/// GET /workers-courses/file/:file_id - public, the id is the only capability
pub async fn course_file_handler(
    State(store): State<Arc<dyn WorkerStore>>,
    PathParam(file_id): PathParam<i32>,
) -> Result<Response, AppError> {
    let file = store
        .find_course_file(file_id)
        .await?
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| AppError::not_found("Course file not found"))?;

    Ok((
        [
            (CONTENT_TYPE, PDF_CONTENT_TYPE),
            (CONTENT_DISPOSITION, "inline; filename=curso.pdf"),
        ],
        file,
    )
        .into_response())
}

// [business] Fields collected from the upload form before validation
#[derive(Debug, Default)]
pub struct CourseForm {
    pub worker_id: Option<String>,
    pub date_file: Option<String>,
    pub is_payed: Option<String>,
    pub file: Option<(Option<String>, Vec<u8>)>, // (declared content type, bytes)
}

impl CourseForm {
    pub fn into_new_course(self) -> Result<NewWorkerCourse, AppError> {
        let worker_id = required(self.worker_id, "worker_id")?
            .trim()
            .parse::<i32>()
            .map_err(|_| AppError::BadRequest("worker_id must be an integer".to_string()))?;

        let date_file = required(self.date_file, "date_file")?;

        let is_payed_raw = required(self.is_payed, "is_payed")?;
        let is_payed = parse_form_bool(&is_payed_raw)
            .ok_or_else(|| AppError::BadRequest("is_payed must be a boolean".to_string()))?;

        let (content_type, file) = self
            .file
            .ok_or_else(|| AppError::BadRequest("Missing field: file".to_string()))?;

        if content_type.as_deref() != Some(PDF_CONTENT_TYPE) {
            return Err(AppError::BadRequest("The file must be a PDF".to_string()));
        }

        Ok(NewWorkerCourse {
            worker_id,
            file,
            date_file,
            is_payed,
        })
    }
}

fn required(value: Option<String>, name: &str) -> Result<String, AppError> {
    value.ok_or_else(|| AppError::BadRequest(format!("Missing field: {}", name)))
}

// Same spellings HTML forms and the previous API accepted
fn parse_form_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// POST /workers-courses - multipart upload of a course certificate
pub async fn upload_course_handler(
    auth: AuthenticatedWorker,
    State(store): State<Arc<dyn WorkerStore>>,
    mut multipart: Multipart,
) -> Result<Json<MessageResponse>, AppError> {
    let mut form = CourseForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let bad_field = |e: axum::extract::multipart::MultipartError| AppError::BadRequest(e.body_text());

        match name.as_str() {
            "worker_id" => form.worker_id = Some(field.text().await.map_err(bad_field)?),
            "date_file" => form.date_file = Some(field.text().await.map_err(bad_field)?),
            "is_payed" => form.is_payed = Some(field.text().await.map_err(bad_field)?),
            "file" => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(bad_field)?;
                form.file = Some((content_type, bytes.to_vec()));
            }
            _ => {} // unknown parts are ignored
        }
    }

    let course = form.into_new_course()?;
    auth.ensure_owner(course.worker_id)?;

    let worker_id = course.worker_id;
    store.insert_worker_course(course).await?;
    info!("Course uploaded for worker {}", worker_id);

    Ok(Json(MessageResponse::new(COURSE_SAVED)))
}
