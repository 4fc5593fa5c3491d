use crate::Config;
use crate::auth::{Identity, SessionUser, build_session_cookie, removal_cookie};
use crate::config::SessionConfig;
use crate::database::postgres_repository::Store;
use crate::database::work_log::WorkLogRepository;
use crate::error::app_error::AppError;
use crate::models::user::{LoginForm, RegisterForm, RegisterRequest};
use crate::models::work_log::{EntryFilter, WorkLogForm, WorkLogRequest};
use crate::service::auth::AuthService;
use crate::service::credentials::Credentials;
use crate::service::report::{report_for, stats_for};
use crate::service::session::SessionAuthenticator;
use crate::web::export::{SpreadsheetDownload, build_workbook, file_name};
use crate::web::views::{self, EntryFormView, FilterValues};
use crate::web::{Page, PageResult};
use chrono::{Local, Utc};
use rocket::form::Form;
use rocket::http::CookieJar;
use rocket::response::Redirect;
use rocket::response::content::RawHtml;
use rocket::{State, get, post};
use tracing::{info, warn};
use validator::{Validate, ValidationErrors};

const LIST_PATH: &str = "/worklog/list";

fn start_session(cookies: &CookieJar<'_>, sessions: &SessionAuthenticator, config: &SessionConfig, identity: &Identity) {
    let state = sessions.start(identity, Utc::now());
    cookies.add_private(build_session_cookie(config, &state));
}

/// First message of the alphabetically first failing field, so the same
/// input always reports the same error.
fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .iter()
        .flat_map(|(field, errs)| errs.iter().map(move |e| (field, e)))
        .map(|(field, e)| match &e.message {
            Some(message) => message.to_string(),
            None => format!("{} is invalid", field),
        })
        .next()
        .unwrap_or_else(|| "Invalid input".to_string())
}

fn inline_message(error: &AppError) -> String {
    match error {
        AppError::BadRequest(message) => message.clone(),
        AppError::ValidationError(errors) => validation_message(errors),
        other => other.to_string(),
    }
}

fn blank_entry_form() -> WorkLogForm {
    WorkLogForm {
        date: Local::now().date_naive().format("%Y-%m-%d").to_string(),
        ..WorkLogForm::default()
    }
}

fn redirect_to_list() -> Page {
    Redirect::to(LIST_PATH).into()
}

#[get("/")]
pub fn index() -> RawHtml<String> {
    views::home_page()
}

#[get("/login?<timeout>")]
pub fn login_page(timeout: Option<&str>) -> RawHtml<String> {
    views::login_page(None, timeout == Some("1"), "")
}

#[post("/login", data = "<form>")]
pub async fn login(
    store: &State<Store>,
    credentials: &State<Credentials>,
    sessions: &State<SessionAuthenticator>,
    config: &State<Config>,
    cookies: &CookieJar<'_>,
    form: Form<LoginForm>,
) -> PageResult {
    let service = AuthService::new(store.inner().as_ref(), credentials.inner());

    match service.login(&form.username, &form.password).await {
        Ok(identity) => {
            start_session(cookies, sessions, &config.session, &identity);
            Ok(Redirect::to("/dashboard").into())
        }
        Err(AppError::InvalidCredentials) => Ok(views::login_page(Some("Invalid username or password"), false, &form.username).into()),
        Err(e) => Err(e.into()),
    }
}

#[get("/register")]
pub fn register_page() -> RawHtml<String> {
    views::register_page(None, "")
}

#[post("/register", data = "<form>")]
pub async fn register(
    store: &State<Store>,
    credentials: &State<Credentials>,
    sessions: &State<SessionAuthenticator>,
    config: &State<Config>,
    cookies: &CookieJar<'_>,
    form: Form<RegisterForm>,
) -> PageResult {
    if let Err(errors) = form.validate() {
        return Ok(views::register_page(Some(&validation_message(&errors)), &form.username).into());
    }

    let service = AuthService::new(store.inner().as_ref(), credentials.inner());
    match service.register(&RegisterRequest::from(&*form)).await {
        Ok(user) => {
            start_session(cookies, sessions, &config.session, &Identity::from(&user));
            Ok(Redirect::to("/dashboard").into())
        }
        Err(AppError::UserAlreadyExists(_)) => Ok(views::register_page(Some("A user with this username already exists"), &form.username).into()),
        Err(e @ AppError::ValidationError(_)) => Ok(views::register_page(Some(&inline_message(&e)), &form.username).into()),
        Err(e) => Err(e.into()),
    }
}

#[get("/dashboard")]
pub async fn dashboard(store: &State<Store>, user: SessionUser) -> PageResult {
    let entries = store.list_entries_chronological(user.user_id).await?;
    Ok(views::dashboard_page(&user.username, &stats_for(&entries)).into())
}

#[get("/worklog/new")]
pub fn new_entry(user: SessionUser) -> RawHtml<String> {
    views::entry_form_page(
        &user.username,
        EntryFormView {
            title: "New entry",
            action: "/worklog/create".to_string(),
            form: &blank_entry_form(),
            error: None,
            success: None,
        },
    )
}

#[post("/worklog/create", data = "<form>")]
pub async fn create_entry(store: &State<Store>, user: SessionUser, form: Form<WorkLogForm>) -> PageResult {
    let request = match WorkLogRequest::try_from(&*form) {
        Ok(request) => request,
        Err(e) if !e.is_internal() => {
            let message = inline_message(&e);
            let view = EntryFormView {
                title: "New entry",
                action: "/worklog/create".to_string(),
                form: &form,
                error: Some(&message),
                success: None,
            };
            return Ok(views::entry_form_page(&user.username, view).into());
        }
        Err(e) => return Err(e.into()),
    };

    let entry = store.create_entry(user.user_id, &request).await?;
    info!(user_id = user.user_id, entry_id = entry.id, "worklog created");

    let view = EntryFormView {
        title: "New entry",
        action: "/worklog/create".to_string(),
        form: &blank_entry_form(),
        error: None,
        success: Some("Entry saved"),
    };
    Ok(views::entry_form_page(&user.username, view).into())
}

#[get("/worklog/list?<date_from>&<date_to>&<search>")]
pub async fn list_entries(store: &State<Store>, user: SessionUser, date_from: Option<String>, date_to: Option<String>, search: Option<String>) -> PageResult {
    let values = FilterValues {
        date_from: date_from.clone().unwrap_or_default(),
        date_to: date_to.clone().unwrap_or_default(),
        search: search.clone().unwrap_or_default(),
    };

    match EntryFilter::from_query(date_from, date_to, search) {
        Ok(filter) => {
            let entries = store.list_entries(user.user_id, &filter).await?;
            Ok(views::entry_list_page(&user.username, &entries, &values, None).into())
        }
        Err(e) => Ok(views::entry_list_page(&user.username, &[], &values, Some(&inline_message(&e))).into()),
    }
}

#[get("/reports")]
pub async fn reports(store: &State<Store>, user: SessionUser) -> PageResult {
    let entries = store.list_entries_chronological(user.user_id).await?;
    Ok(views::reports_page(&user.username, &report_for(&entries)).into())
}

#[get("/worklog/edit/<id>")]
pub async fn edit_entry(store: &State<Store>, user: SessionUser, id: &str) -> PageResult {
    let entry = match id.parse::<i64>() {
        Ok(id) => store.get_entry(id, user.user_id).await?,
        Err(_) => None,
    };

    let Some(entry) = entry else {
        warn!(user_id = user.user_id, entry_id = %id, "edit requested for missing or foreign entry");
        return Ok(redirect_to_list());
    };

    let view = EntryFormView {
        title: "Edit entry",
        action: format!("/worklog/update/{}", entry.id),
        form: &WorkLogForm::from(&entry),
        error: None,
        success: None,
    };
    Ok(views::entry_form_page(&user.username, view).into())
}

#[post("/worklog/update/<id>", data = "<form>")]
pub async fn update_entry(store: &State<Store>, user: SessionUser, id: &str, form: Form<WorkLogForm>) -> PageResult {
    let Ok(id) = id.parse::<i64>() else {
        return Ok(redirect_to_list());
    };

    let request = match WorkLogRequest::try_from(&*form) {
        Ok(request) => request,
        Err(e) if !e.is_internal() => {
            let message = inline_message(&e);
            let view = EntryFormView {
                title: "Edit entry",
                action: format!("/worklog/update/{}", id),
                form: &form,
                error: Some(&message),
                success: None,
            };
            return Ok(views::entry_form_page(&user.username, view).into());
        }
        Err(e) => return Err(e.into()),
    };

    if store.update_entry(id, user.user_id, &request).await? {
        info!(user_id = user.user_id, entry_id = id, "worklog updated");
    } else {
        warn!(user_id = user.user_id, entry_id = id, "update requested for missing or foreign entry");
    }
    Ok(redirect_to_list())
}

#[post("/worklog/delete/<id>")]
pub async fn delete_entry(store: &State<Store>, user: SessionUser, id: &str) -> PageResult {
    let Ok(id) = id.parse::<i64>() else {
        return Ok(redirect_to_list());
    };

    if store.delete_entry(id, user.user_id).await? {
        info!(user_id = user.user_id, entry_id = id, "worklog deleted");
    } else {
        warn!(user_id = user.user_id, entry_id = id, "delete requested for missing or foreign entry");
    }
    Ok(redirect_to_list())
}

#[get("/worklog/export?<date_from>&<date_to>&<search>")]
pub async fn export_entries(store: &State<Store>, user: SessionUser, date_from: Option<String>, date_to: Option<String>, search: Option<String>) -> PageResult {
    let filter = EntryFilter::from_query(date_from, date_to, search)?;
    let entries = store.list_entries(user.user_id, &filter).await?;
    let bytes = build_workbook(&entries)?;

    info!(user_id = user.user_id, rows = entries.len(), "worklog exported");
    Ok(Page::Download(SpreadsheetDownload {
        file_name: file_name(&user.username, Local::now().date_naive()),
        bytes,
    }))
}

#[get("/logout")]
pub fn logout(cookies: &CookieJar<'_>, config: &State<Config>) -> Redirect {
    cookies.remove_private(removal_cookie(&config.session));
    Redirect::to("/login")
}
