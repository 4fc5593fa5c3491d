use crate::config::SessionConfig;
use crate::error::app_error::AppError;
use crate::models::session::SessionState;
use crate::models::user::User;
use crate::service::session::{SessionAuthenticator, SessionRejection};
use crate::service::token::{TokenAuthenticator, parse_bearer};
use chrono::Utc;
use rocket::http::{Cookie, SameSite, Status};
use rocket::outcome::Outcome;
use rocket::request::{FromRequest, Outcome as RequestOutcome, Request};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::{Object, Responses, SecurityRequirement, SecurityScheme, SecuritySchemeData};
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};
use serde::Serialize;
use std::ops::Deref;
use tracing::{debug, info};

/// The authenticated user, whichever surface established it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
        }
    }
}

/// Web request guard: a live cookie session.
#[derive(Debug, Clone)]
pub struct SessionUser(pub Identity);

/// API request guard: a valid `Authorization: Bearer` token.
#[derive(Debug, Clone)]
pub struct BearerUser(pub Identity);

impl Deref for SessionUser {
    type Target = Identity;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Deref for BearerUser {
    type Target = Identity;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

pub fn build_session_cookie(config: &SessionConfig, state: &SessionState) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), state.to_cookie_value()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .build()
}

pub fn removal_cookie(config: &SessionConfig) -> Cookie<'static> {
    Cookie::build(config.cookie_name.clone()).path("/").build()
}

/// Whether the current request's session was discarded for inactivity.
pub fn session_expired(req: &Request<'_>) -> bool {
    matches!(req.local_cache(|| None::<SessionRejection>), Some(SessionRejection::Expired))
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SessionUser {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let (sessions, config) = match (req.rocket().state::<SessionAuthenticator>(), req.rocket().state::<crate::Config>()) {
            (Some(sessions), Some(config)) => (sessions, &config.session),
            _ => return Outcome::Error((Status::InternalServerError, AppError::internal("Session authenticator not configured"))),
        };

        let cookies = req.cookies();
        let cookie = cookies.get_private(&config.cookie_name);
        let state = cookie.as_ref().and_then(|c| SessionState::from_cookie_value(c.value()));

        match sessions.authenticate(state.as_ref(), Utc::now()) {
            Ok((identity, refreshed)) => {
                cookies.add_private(build_session_cookie(config, &refreshed));
                req.local_cache(|| Some(identity.clone()));
                Outcome::Success(SessionUser(identity))
            }
            Err(rejection) => {
                if cookie.is_some() {
                    cookies.remove_private(removal_cookie(config));
                }
                req.local_cache(|| Some(rejection));

                match rejection {
                    SessionRejection::Expired => {
                        info!(user_id = state.as_ref().map(|s| s.user_id), "session expired after inactivity");
                        Outcome::Error((Status::Unauthorized, AppError::SessionExpired))
                    }
                    SessionRejection::NotAuthenticated => Outcome::Error((Status::Unauthorized, AppError::Unauthorized)),
                }
            }
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for BearerUser {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let Some(tokens) = req.rocket().state::<TokenAuthenticator>() else {
            return Outcome::Error((Status::InternalServerError, AppError::internal("Token authenticator not configured")));
        };

        match parse_bearer(req.headers().get_one("Authorization")).and_then(|token| tokens.verify(token)) {
            Ok(identity) => {
                req.local_cache(|| Some(identity.clone()));
                Outcome::Success(BearerUser(identity))
            }
            Err(reason) => {
                debug!(reason = ?reason, uri = %req.uri(), "bearer token rejected");
                Outcome::Error((Status::Unauthorized, reason.into()))
            }
        }
    }
}

impl<'a> OpenApiFromRequest<'a> for BearerUser {
    fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        let security_scheme = SecurityScheme {
            description: Some("Bearer token. Obtain one from POST /auth/login or POST /auth/register.".to_string()),
            data: SecuritySchemeData::Http {
                scheme: "bearer".to_string(),
                bearer_format: Some("JWT".to_string()),
            },
            extensions: Object::default(),
        };

        let mut security_req = SecurityRequirement::new();
        security_req.insert("bearerAuth".to_string(), Vec::new());

        Ok(RequestHeaderInput::Security("bearerAuth".to_string(), security_scheme, security_req))
    }

    fn get_responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        use rocket_okapi::okapi::openapi3::{RefOr, Response};
        let mut responses = Responses::default();
        responses.responses.insert(
            "401".to_string(),
            RefOr::Object(Response {
                description: "Unauthorized - missing, malformed or invalid token".to_string(),
                ..Default::default()
            }),
        );
        Ok(responses)
    }
}
