pub mod post;
pub mod postgres_repository;
pub mod reset_token;
pub mod session;
pub mod user;
