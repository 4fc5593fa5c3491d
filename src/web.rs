pub mod catchers;
pub mod export;
pub mod pages;
pub mod views;

use crate::error::app_error::{AppError, log_request_failure};
use crate::web::export::SpreadsheetDownload;
use rocket::http::Status;
use rocket::response::content::RawHtml;
use rocket::response::{Redirect, Responder, Response};
use rocket::Request;

/// What a page handler answers when it does not fail.
#[derive(rocket::Responder)]
pub enum Page {
    Html(RawHtml<String>),
    Redirect(Redirect),
    Download(SpreadsheetDownload),
}

impl From<RawHtml<String>> for Page {
    fn from(html: RawHtml<String>) -> Self {
        Page::Html(html)
    }
}

impl From<Redirect> for Page {
    fn from(redirect: Redirect) -> Self {
        Page::Redirect(redirect)
    }
}

/// A failure rendered as an HTML error page. Internal details are logged,
/// never shown.
#[derive(Debug)]
pub struct PageError(pub AppError);

impl From<AppError> for PageError {
    fn from(error: AppError) -> Self {
        PageError(error)
    }
}

impl<'r> Responder<'r, 'static> for PageError {
    fn respond_to(self, req: &'r Request<'_>) -> rocket::response::Result<'static> {
        log_request_failure(&self.0, req);

        let status = Status::from(&self.0);
        let message = if self.0.is_internal() {
            "Something went wrong on our side. Please try again.".to_string()
        } else {
            self.0.to_string()
        };

        Response::build_from(views::error_page(status, &message).respond_to(req)?).status(status).ok()
    }
}

pub type PageResult = Result<Page, PageError>;

pub fn routes() -> Vec<rocket::Route> {
    rocket::routes![
        pages::index,
        pages::login_page,
        pages::login,
        pages::register_page,
        pages::register,
        pages::dashboard,
        pages::new_entry,
        pages::create_entry,
        pages::list_entries,
        pages::reports,
        pages::edit_entry,
        pages::update_entry,
        pages::delete_entry,
        pages::export_entries,
        pages::logout,
    ]
}

pub fn catchers() -> Vec<rocket::Catcher> {
    rocket::catchers![catchers::unauthorized, catchers::not_found, catchers::unprocessable_entity, catchers::internal_error]
}
