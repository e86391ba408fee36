pub mod field_error;
pub mod post;
pub mod user;
