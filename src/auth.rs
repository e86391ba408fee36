use crate::config::{Config, SessionConfig};
use crate::database::postgres_repository::PostgresRepository;
use crate::database::session::{RedisSessionStore, SessionStore};
use crate::database::user::UserRepository;
use crate::error::app_error::AppError;
use redis::aio::ConnectionManager;
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::outcome::Outcome;
use rocket::request::{FromRequest, Outcome as RequestOutcome, Request};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::{Object, Responses, SecurityRequirement, SecurityScheme, SecuritySchemeData};
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// The logged-in user behind the session cookie. Routes that demand
/// authentication take this as a request guard; everything else resolves
/// the session explicitly to produce envelope errors instead of a 401.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
}

pub(crate) fn parse_session_id(value: &str) -> Option<Uuid> {
    Uuid::parse_str(value).ok()
}

/// Session id carried by the private cookie, if any.
pub fn session_id_from_cookies(cookies: &CookieJar<'_>, config: &SessionConfig) -> Option<Uuid> {
    let cookie = cookies.get_private(&config.cookie_name)?;
    parse_session_id(cookie.value())
}

/// Binds a fresh session to the client. httpOnly + lax, ten-year default
/// lifetime; the server never expires the session entry itself.
pub fn add_session_cookie(cookies: &CookieJar<'_>, config: &SessionConfig, session_id: Uuid) {
    cookies.add_private(
        Cookie::build((config.cookie_name.clone(), session_id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(config.cookie_secure)
            .max_age(rocket::time::Duration::days(config.cookie_max_age_days))
            .build(),
    );
}

pub fn remove_session_cookie(cookies: &CookieJar<'_>, config: &SessionConfig) {
    cookies.remove_private(Cookie::build(config.cookie_name.clone()).path("/").build());
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CurrentUser {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let rocket = req.rocket();
        let (Some(config), Some(pool), Some(manager)) = (rocket.state::<Config>(), rocket.state::<PgPool>(), rocket.state::<ConnectionManager>()) else {
            return Outcome::Error((Status::InternalServerError, AppError::Unauthorized));
        };

        let Some(session_id) = session_id_from_cookies(req.cookies(), &config.session) else {
            return Outcome::Error((Status::Unauthorized, AppError::Unauthorized));
        };

        let sessions = RedisSessionStore::new(manager.clone());
        let user_id = match sessions.get(&session_id).await {
            Ok(Some(user_id)) => user_id,
            Ok(None) => return Outcome::Error((Status::Unauthorized, AppError::Unauthorized)),
            Err(err) => return Outcome::Error((Status::InternalServerError, err)),
        };

        let repo = PostgresRepository { pool: pool.clone() };
        match repo.find_by_id(user_id).await {
            Ok(Some(user)) => Outcome::Success(CurrentUser {
                id: user.id,
                username: user.username,
            }),
            Ok(None) => Outcome::Error((Status::Unauthorized, AppError::Unauthorized)),
            Err(err) => Outcome::Error((Status::InternalServerError, err)),
        }
    }
}

impl<'a> OpenApiFromRequest<'a> for CurrentUser {
    fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        // Document the cookie-based authentication requirement
        let security_scheme = SecurityScheme {
            description: Some("Cookie-based authentication. Log in via POST /api/users/login to obtain the session cookie.".to_string()),
            data: SecuritySchemeData::ApiKey {
                name: "qid".to_string(),
                location: "cookie".to_string(),
            },
            extensions: Object::default(),
        };

        let mut security_req = SecurityRequirement::new();
        security_req.insert("cookieAuth".to_string(), Vec::new());

        Ok(RequestHeaderInput::Security("cookieAuth".to_string(), security_scheme, security_req))
    }

    fn get_responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        use rocket_okapi::okapi::openapi3::{RefOr, Response};
        let mut responses = Responses::default();
        responses.responses.insert(
            "401".to_string(),
            RefOr::Object(Response {
                description: "Unauthorized - Authentication required".to_string(),
                ..Default::default()
            }),
        );
        Ok(responses)
    }
}
