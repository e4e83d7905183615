// [rust] Worker self-service operations - each file holds a service function and its handler
pub mod courses; // [business] Course certificate listing, download and upload
pub mod password; // [security] Password change with current-password check
pub mod scales; // [business] Schedule lookup with strict list decoding
pub mod update; // [business] Allow-listed partial profile updates

pub use courses::{
    course_file_handler, list_courses_handler, upload_course_handler, MAX_COURSE_UPLOAD_BYTES,
};
pub use password::change_password_handler;
pub use scales::{parse_date_list, scales_handler, ScheduleFormatError};
pub use update::update_worker_handler;
