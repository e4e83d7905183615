// [library] Serde - JSON serialization/deserialization framework for Rust
// Serialize: convert Rust structs to JSON for API responses
// Deserialize: parse JSON request bodies into Rust structs
use serde::{Deserialize, Serialize};

// [business] Column list shared by every query that returns a full worker
pub const WORKER_COLUMNS: &str = "id, name, cpf, app_login, app_password, is_active, \
     subsidiarie_id, email, phone, mobile_phone, street, street_number, neighborhood, city, state, cep";

// [business] Worker entity - an employee with app credentials and profile fields
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Worker {
    pub id: i32,           // [business] Primary key - becomes the token subject
    pub name: String,      // [business] Full name
    pub cpf: String,       // [business] Personal identifier (CPF); default password seed
    pub app_login: String, // [business] Unique login for the worker app

    // [security] Salted password hash - never serialized to clients
    #[serde(skip_serializing)]
    pub app_password: String,

    pub is_active: bool, // [business] Only active workers may authenticate
    pub subsidiarie_id: Option<i32>,

    // [business] Self-service profile fields
    pub email: Option<String>,
    pub phone: Option<String>,
    pub mobile_phone: Option<String>,
    pub street: Option<String>,
    pub street_number: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub cep: Option<String>,
}

// [business] Raw schedule row - both lists are stored as serialized text
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct ScaleRecord {
    pub days_off: Option<String>,
    pub ilegal_dates: Option<String>,
}

// [business] Course certificate row including the PDF bytes
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WorkerCourse {
    pub id: i32,
    pub worker_id: i32,
    pub file: Option<Vec<u8>>,
    pub date_file: String,
    pub is_payed: bool,
}

// [business] Input for a course upload
#[derive(Debug, Clone)]
pub struct NewWorkerCourse {
    pub worker_id: i32,
    pub file: Vec<u8>,
    pub date_file: String,
    pub is_payed: bool,
}

// [business] Data Transfer Objects (DTOs) for requests and responses

// [business] Login request body
#[derive(Debug, Deserialize)]
pub struct AuthData {
    pub app_login: String,
    pub app_password: String, // [security] Plaintext, only ever passed to the hasher
}

// [business] Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String, // [security] Signed access token
    pub token_type: String,   // [business] Always "bearer"
    pub worker_data: Worker,
    pub need_change_password: bool, // [security] Account still holds its CPF-derived password
}

// [business] Password change request body
#[derive(Debug, Deserialize)]
pub struct PasswordChangeRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

// [business] Partial update response: status message plus the current record
#[derive(Debug, Serialize)]
pub struct WorkerUpdateResponse {
    pub message: String,
    pub worker: Worker,
}

// [business] Decoded schedule lists
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct ScaleResponse {
    pub days_off: Vec<String>,
    pub ilegal_dates: Vec<String>,
}

// [business] Course listing entry - PDF inlined as base64
#[derive(Debug, Serialize)]
pub struct CourseSummary {
    pub id: i32,
    pub worker_id: i32,
    pub date_file: String,
    pub is_payed: bool,
    pub file_base64: String,
}
