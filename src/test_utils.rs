use crate::Config;
use crate::config::PasswordConfig;
use crate::database::postgres_repository::Store;
use crate::database::user::UserRepository;
use crate::database::work_log::WorkLogRepository;
use crate::error::app_error::AppError;
use crate::models::user::User;
use crate::models::work_log::{EntryFilter, WorkLog, WorkLogRequest};
use crate::service::credentials::Credentials;
use chrono::NaiveDate;
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use rocket::{Build, Rocket};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Default)]
struct MemoryState {
    users: Vec<User>,
    entries: Vec<WorkLog>,
    next_user_id: i64,
    next_entry_id: i64,
}

/// In-process stand-in for Postgres with the same ownership and ordering rules.
#[derive(Default)]
pub struct MemoryRepository {
    state: Mutex<MemoryState>,
}

#[async_trait::async_trait]
impl UserRepository for MemoryRepository {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        let mut state = self.state.lock().await;
        if state.users.iter().any(|u| u.username == username) {
            return Err(AppError::UserAlreadyExists(username.to_string()));
        }

        state.next_user_id += 1;
        let user = User {
            id: state.next_user_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }
}

#[async_trait::async_trait]
impl WorkLogRepository for MemoryRepository {
    async fn create_entry(&self, user_id: i64, request: &WorkLogRequest) -> Result<WorkLog, AppError> {
        let mut state = self.state.lock().await;
        state.next_entry_id += 1;
        let entry = WorkLog {
            id: state.next_entry_id,
            user_id,
            date: request.date,
            description: request.description.clone(),
            hours: request.hours,
        };
        state.entries.push(entry.clone());
        Ok(entry)
    }

    async fn get_entry(&self, id: i64, user_id: i64) -> Result<Option<WorkLog>, AppError> {
        let state = self.state.lock().await;
        Ok(state.entries.iter().find(|e| e.id == id && e.user_id == user_id).cloned())
    }

    async fn list_entries(&self, user_id: i64, filter: &EntryFilter) -> Result<Vec<WorkLog>, AppError> {
        let state = self.state.lock().await;
        let mut entries: Vec<WorkLog> = state.entries.iter().filter(|e| e.user_id == user_id && filter.matches(e)).cloned().collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(entries)
    }

    async fn list_entries_chronological(&self, user_id: i64) -> Result<Vec<WorkLog>, AppError> {
        let state = self.state.lock().await;
        let mut entries: Vec<WorkLog> = state.entries.iter().filter(|e| e.user_id == user_id).cloned().collect();
        entries.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        Ok(entries)
    }

    async fn update_entry(&self, id: i64, user_id: i64, request: &WorkLogRequest) -> Result<bool, AppError> {
        let mut state = self.state.lock().await;
        match state.entries.iter_mut().find(|e| e.id == id && e.user_id == user_id) {
            Some(entry) => {
                entry.date = request.date;
                entry.description = request.description.clone();
                entry.hours = request.hours;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_entry(&self, id: i64, user_id: i64) -> Result<bool, AppError> {
        let mut state = self.state.lock().await;
        let before = state.entries.len();
        state.entries.retain(|e| !(e.id == id && e.user_id == user_id));
        Ok(state.entries.len() != before)
    }
}

fn fast_password_config() -> PasswordConfig {
    PasswordConfig {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    }
}

pub fn fast_credentials() -> Credentials {
    Credentials::new(&fast_password_config()).expect("valid argon2 parameters")
}

pub fn sample_work_log(user_id: i64, date: NaiveDate, description: &str, hours: f64) -> WorkLog {
    WorkLog {
        id: 0,
        user_id,
        date,
        description: description.to_string(),
        hours,
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.password = fast_password_config();
    config.api.enable_swagger = false;
    config
}

pub fn rocket_with_store(store: Store) -> Rocket<Build> {
    crate::build_rocket_with_store(test_config(), store)
}

pub fn rocket_with_memory_store() -> Rocket<Build> {
    rocket_with_store(Arc::new(MemoryRepository::default()))
}

pub async fn tracked_client() -> Client {
    Client::tracked(rocket_with_memory_store()).await.expect("valid rocket instance")
}

/// Register through the API and return the issued bearer token.
pub async fn register_api_user(client: &Client, username: &str, password: &str) -> String {
    let response = client
        .post("/api/v1/auth/register")
        .header(ContentType::JSON)
        .body(serde_json::json!({ "username": username, "password": password }).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);

    let body: serde_json::Value = serde_json::from_str(&response.into_string().await.expect("response body")).expect("json body");
    body["token"].as_str().expect("token in response").to_string()
}

pub fn bearer(token: &str) -> rocket::http::Header<'static> {
    rocket::http::Header::new("Authorization", format!("Bearer {}", token))
}
