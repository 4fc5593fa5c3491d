use crate::Config;
use crate::auth::{removal_cookie, session_expired};
use crate::web::views;
use rocket::http::Status;
use rocket::response::Redirect;
use rocket::response::content::RawHtml;
use rocket::{Request, catch};

/// Rocket drops cookie changes made by a failing guard, so a rejected
/// session cookie is cleared here.
#[catch(401)]
pub fn unauthorized(req: &Request) -> Redirect {
    if let Some(config) = req.rocket().state::<Config>() {
        let cookies = req.cookies();
        if cookies.get(&config.session.cookie_name).is_some() {
            cookies.remove_private(removal_cookie(&config.session));
        }
    }

    if session_expired(req) {
        Redirect::to("/login?timeout=1")
    } else {
        Redirect::to("/login")
    }
}

#[catch(404)]
pub fn not_found(_: &Request) -> RawHtml<String> {
    views::error_page(Status::NotFound, "The page you asked for does not exist.")
}

#[catch(422)]
pub fn unprocessable_entity(_: &Request) -> RawHtml<String> {
    views::error_page(Status::UnprocessableEntity, "The submitted form was incomplete.")
}

#[catch(500)]
pub fn internal_error(_: &Request) -> RawHtml<String> {
    views::error_page(Status::InternalServerError, "Something went wrong on our side. Please try again.")
}
