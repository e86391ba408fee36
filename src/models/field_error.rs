use rocket::serde::Serialize;
use schemars::JsonSchema;

/// Flat numeric taxonomy for field-scoped errors. Clients switch on these
/// codes, so they are part of the wire contract.
pub mod codes {
    pub const USERNAME: u16 = 101;
    pub const EMAIL: u16 = 102;
    pub const PASSWORD: u16 = 103;
    pub const REGISTER: u16 = 104;
    pub const LOGIN: u16 = 105;
    pub const FORGOT_PASSWORD: u16 = 106;
    pub const TOKEN: u16 = 107;
    pub const NEW_PASSWORD: u16 = 108;
    pub const CHANGE_PASSWORD: u16 = 109;
    pub const SESSION: u16 = 110;
}

/// Validation or domain error scoped to a named input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct FieldError {
    pub id: u16,
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(id: u16, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn session(message: impl Into<String>) -> Self {
        Self::new(codes::SESSION, "session", message)
    }
}
