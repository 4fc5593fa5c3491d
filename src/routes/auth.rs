use crate::auth::Identity;
use crate::database::postgres_repository::Store;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::models::user::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
use crate::routes::Created;
use crate::service::auth::AuthService;
use crate::service::credentials::Credentials;
use crate::service::token::TokenAuthenticator;
use rocket::serde::json::Json;
use rocket::{State, post};
use rocket_okapi::openapi;

/// Exchange credentials for a bearer token
#[openapi(tag = "Auth")]
#[post("/login", data = "<payload>")]
pub async fn login(
    store: &State<Store>,
    credentials: &State<Credentials>,
    tokens: &State<TokenAuthenticator>,
    payload: JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let service = AuthService::new(store.inner().as_ref(), credentials.inner());
    let identity = service.login(&payload.username, &payload.password).await?;
    let token = tokens.issue(&identity)?;

    Ok(Json(AuthResponse {
        token,
        user: UserResponse {
            id: identity.user_id,
            username: identity.username,
        },
    }))
}

/// Create an account and return a bearer token for it
#[openapi(tag = "Auth")]
#[post("/register", data = "<payload>")]
pub async fn register(
    store: &State<Store>,
    credentials: &State<Credentials>,
    tokens: &State<TokenAuthenticator>,
    payload: JsonBody<RegisterRequest>,
) -> Result<Created<AuthResponse>, AppError> {
    let service = AuthService::new(store.inner().as_ref(), credentials.inner());
    let user = service.register(&payload).await?;
    let token = tokens.issue(&Identity::from(&user))?;

    Ok(Created(AuthResponse {
        token,
        user: UserResponse::from(&user),
    }))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![login, register]
}
