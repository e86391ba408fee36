pub mod error;
pub mod health;
pub mod password_reset;
pub mod post;
pub mod user;
