use crate::error::app_error::ErrorBody;
use rocket::serde::json::Json;
use rocket::{Request, catch};

fn body(message: &str) -> Json<ErrorBody> {
    Json(ErrorBody { error: message.to_string() })
}

#[catch(400)]
pub fn bad_request(_: &Request) -> Json<ErrorBody> {
    body("Invalid request")
}

#[catch(401)]
pub fn unauthorized(_: &Request) -> Json<ErrorBody> {
    body("Unauthorized")
}

#[catch(404)]
pub fn not_found(_: &Request) -> Json<ErrorBody> {
    body("Not found")
}

#[catch(409)]
pub fn conflict(_: &Request) -> Json<ErrorBody> {
    body("Conflict")
}

#[catch(422)]
pub fn unprocessable_entity(_: &Request) -> Json<ErrorBody> {
    body("Invalid request")
}

#[catch(500)]
pub fn internal_error(_: &Request) -> Json<ErrorBody> {
    body("Internal server error")
}

#[cfg(test)]
mod tests {
    use crate::test_utils::tracked_client;
    use rocket::http::Status;

    #[rocket::async_test]
    async fn unknown_api_paths_answer_json() {
        let client = tracked_client().await;
        let response = client.get("/api/v1/nope").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
        assert_eq!(response.into_string().await.as_deref(), Some(r#"{"error":"Not found"}"#));
    }
}
