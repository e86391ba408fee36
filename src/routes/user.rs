use crate::auth::{add_session_cookie, remove_session_cookie, session_id_from_cookies};
use crate::config::Config;
use crate::database::postgres_repository::PostgresRepository;
use crate::database::user::UserRepository;
use crate::error::app_error::AppError;
use crate::models::user::{LoginRequest, RegisterRequest, UserDto, UserResponse};
use crate::service::auth::AuthStores;
use redis::aio::ConnectionManager;
use rocket::{State, get, post};
use rocket::http::CookieJar;
use rocket::serde::json::Json;
use rocket_okapi::openapi;
use sqlx::PgPool;

/// Register a new account. On success the fresh session is bound to the
/// cookie jar, logging the user straight in.
#[openapi(tag = "Users")]
#[post("/", data = "<payload>")]
pub async fn register(
    pool: &State<PgPool>,
    redis: &State<ConnectionManager>,
    config: &State<Config>,
    cookies: &CookieJar<'_>,
    payload: Json<RegisterRequest>,
) -> Json<UserResponse> {
    let stores = AuthStores::new(pool.inner().clone(), redis.inner().clone(), config);
    let outcome = stores.service(config).register(&payload).await;
    Json(outcome.into_response(|session_id| add_session_cookie(cookies, &config.session, session_id)))
}

#[openapi(tag = "Users")]
#[post("/login", data = "<payload>")]
pub async fn login(
    pool: &State<PgPool>,
    redis: &State<ConnectionManager>,
    config: &State<Config>,
    cookies: &CookieJar<'_>,
    payload: Json<LoginRequest>,
) -> Json<UserResponse> {
    let stores = AuthStores::new(pool.inner().clone(), redis.inner().clone(), config);
    let outcome = stores.service(config).login(&payload.email, &payload.password).await;
    Json(outcome.into_response(|session_id| add_session_cookie(cookies, &config.session, session_id)))
}

/// Destroys the server-side session and clears the cookie. Answers `false`
/// when the session entry could not be removed.
#[openapi(tag = "Users")]
#[post("/logout")]
pub async fn logout(pool: &State<PgPool>, redis: &State<ConnectionManager>, config: &State<Config>, cookies: &CookieJar<'_>) -> Json<bool> {
    let destroyed = match session_id_from_cookies(cookies, &config.session) {
        Some(session_id) => {
            let stores = AuthStores::new(pool.inner().clone(), redis.inner().clone(), config);
            stores.service(config).logout(&session_id).await
        }
        // no session to destroy; clearing the cookie is all there is to do
        None => true,
    };

    if destroyed {
        remove_session_cookie(cookies, &config.session);
    }
    Json(destroyed)
}

#[openapi(tag = "Users")]
#[get("/me")]
pub async fn me(pool: &State<PgPool>, redis: &State<ConnectionManager>, config: &State<Config>, cookies: &CookieJar<'_>) -> Json<UserResponse> {
    let stores = AuthStores::new(pool.inner().clone(), redis.inner().clone(), config);
    let session_id = session_id_from_cookies(cookies, &config.session);
    Json(stores.service(config).me(session_id).await)
}

#[openapi(tag = "Users")]
#[get("/")]
pub async fn list_users(pool: &State<PgPool>) -> Result<Json<Vec<UserDto>>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let users = repo.list().await?;
    Ok(Json(users.iter().map(UserDto::from).collect()))
}

pub fn routes() -> (Vec<rocket::Route>, rocket_okapi::okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![register, login, logout, me, list_users]
}
