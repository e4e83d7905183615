pub mod extract;
pub mod routes;

pub use extract::PathParam;
pub use routes::*;
