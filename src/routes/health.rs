use rocket::get;
use rocket::serde::Serialize;
use rocket::serde::json::Json;
use rocket_okapi::openapi;
use schemars::JsonSchema;

#[derive(Serialize, JsonSchema)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[openapi(tag = "Health")]
#[get("/")]
pub async fn healthcheck() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub fn routes() -> (Vec<rocket::Route>, rocket_okapi::okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![healthcheck]
}
