pub mod auth;
pub mod error;
pub mod health;
pub mod report;
pub mod work_log;

use rocket::http::Status;
use rocket::response::{Responder, Response};
use rocket::serde::json::Json;
use rocket::Request;
use rocket_okapi::OpenApiError;
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::Responses;
use rocket_okapi::response::OpenApiResponderInner;
use schemars::JsonSchema;
use serde::Serialize;

/// A JSON body answered with `201 Created` instead of `200 OK`.
#[derive(Debug)]
pub struct Created<T>(pub T);

impl<'r, T: Serialize> Responder<'r, 'static> for Created<T> {
    fn respond_to(self, req: &'r Request<'_>) -> rocket::response::Result<'static> {
        Response::build_from(Json(self.0).respond_to(req)?).status(Status::Created).ok()
    }
}

impl<T: Serialize + JsonSchema + Send> OpenApiResponderInner for Created<T> {
    fn responses(r#gen: &mut OpenApiGenerator) -> Result<Responses, OpenApiError> {
        let mut responses = Json::<T>::responses(r#gen)?;
        if let Some(ok) = responses.responses.remove("200") {
            responses.responses.insert("201".to_string(), ok);
        }
        Ok(responses)
    }
}
