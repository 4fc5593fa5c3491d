use crate::auth::BearerUser;
use crate::database::postgres_repository::Store;
use crate::database::work_log::WorkLogRepository;
use crate::error::app_error::AppError;
use crate::models::report::{WorkReport, WorkStats};
use crate::service::report::{report_for, stats_for};
use rocket::serde::json::Json;
use rocket::{State, get};
use rocket_okapi::openapi;

/// Total, count and average hours over all of the caller's entries
#[openapi(tag = "Reports")]
#[get("/stats")]
pub async fn get_stats(store: &State<Store>, user: BearerUser) -> Result<Json<WorkStats>, AppError> {
    let entries = store.list_entries_chronological(user.user_id).await?;
    Ok(Json(stats_for(&entries)))
}

/// Daily series plus monthly and ISO-week totals, oldest first
#[openapi(tag = "Reports")]
#[get("/reports")]
pub async fn get_report(store: &State<Store>, user: BearerUser) -> Result<Json<WorkReport>, AppError> {
    let entries = store.list_entries_chronological(user.user_id).await?;
    Ok(Json(report_for(&entries)))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![get_stats, get_report]
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{bearer, register_api_user, tracked_client};
    use rocket::http::{ContentType, Status};
    use rocket::local::asynchronous::Client;
    use serde_json::{Value, json};

    async fn seed(client: &Client, token: &str) {
        for (date, hours) in [("2024-01-08", 3.0), ("2024-01-01", 2.0)] {
            let response = client
                .post("/api/v1/worklogs")
                .header(ContentType::JSON)
                .header(bearer(token))
                .body(json!({"date": date, "description": "work", "hours": hours}).to_string())
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::Created);
        }
    }

    async fn get_json(client: &Client, token: &str, uri: &'static str) -> Value {
        let response = client.get(uri).header(bearer(token)).dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        serde_json::from_str(&response.into_string().await.unwrap()).unwrap()
    }

    #[rocket::async_test]
    async fn stats_summarise_only_the_callers_entries() {
        let client = tracked_client().await;
        let alice = register_api_user(&client, "alice", "secret1").await;
        let bob = register_api_user(&client, "bob", "secret1").await;
        seed(&client, &alice).await;

        let stats = get_json(&client, &alice, "/api/v1/stats").await;
        assert_eq!(stats["total_hours"], 5.0);
        assert_eq!(stats["days_count"], 2);
        assert_eq!(stats["avg_hours"], 2.5);

        let empty = get_json(&client, &bob, "/api/v1/stats").await;
        assert_eq!(empty["total_hours"], 0.0);
        assert_eq!(empty["days_count"], 0);
        assert_eq!(empty["avg_hours"], 0.0);
    }

    #[rocket::async_test]
    async fn report_is_chronological() {
        let client = tracked_client().await;
        let token = register_api_user(&client, "alice", "secret1").await;
        seed(&client, &token).await;

        let report = get_json(&client, &token, "/api/v1/reports").await;
        assert_eq!(report["daily"]["labels"], json!(["01.01", "08.01"]));
        assert_eq!(report["daily"]["hours"], json!([2.0, 3.0]));
        assert_eq!(report["monthly"][0]["key"], "2024-01");
        assert_eq!(report["monthly"][0]["total_hours"], 5.0);
        assert_eq!(report["weekly"][0]["key"], "2024-W01");
        assert_eq!(report["weekly"][1]["key"], "2024-W02");
        assert_eq!(report["total_hours"], 5.0);
    }

    #[rocket::async_test]
    async fn stats_require_a_token() {
        let client = tracked_client().await;
        let response = client.get("/api/v1/stats").dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);
    }
}
