mod auth;
mod config;
mod database;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod service;
mod web;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;

use crate::db::stage_db;
use crate::middleware::RequestLogger;
use crate::routes as app_routes;
use crate::service::credentials::Credentials;
use crate::service::session::SessionAuthenticator;
use crate::service::token::TokenAuthenticator;
use rocket::figment::Profile;
use rocket::{Build, Rocket, catchers, http::Method};
use rocket_cors::{AllowedOrigins, CorsOptions};
use rocket_okapi::swagger_ui::{SwaggerUIConfig, make_swagger_ui};
use rocket_okapi::{get_openapi_route, okapi::merge::marge_spec_list};
use tracing_subscriber::EnvFilter;

fn init_tracing(log_level: &str, json_format: bool) {
    // RUST_LOG overrides the configured level, e.g. RUST_LOG=info,worklog_tracker::web=debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_line_number(true);

    // A subscriber may already be installed (tests build several instances).
    let _ = if json_format { subscriber.json().try_init() } else { subscriber.try_init() };
}

/// The profile Rocket itself will select: `ROCKET_PROFILE` if set, otherwise
/// `debug` or `release` depending on how the binary was built.
fn active_profile() -> Profile {
    rocket::Config::figment().profile().clone()
}

fn ensure_rocket_secret_key(profile: &Profile) {
    // Private session cookies are encrypted with this key.
    if *profile != rocket::Config::DEBUG_PROFILE && std::env::var("ROCKET_SECRET_KEY").is_err() {
        panic!(
            "ROCKET_SECRET_KEY is required for profile '{}'. Generate one with: openssl rand -base64 32",
            profile
        );
    }
}

fn ensure_token_secret(profile: &Profile, token_config: &config::TokenConfig) {
    if *profile != rocket::Config::DEBUG_PROFILE && token_config.secret == config::DEV_TOKEN_SECRET {
        panic!(
            "token.secret must be set for profile '{}' (WORKLOG_TOKEN__SECRET). Generate one with: openssl rand -base64 48",
            profile
        );
    }
}

fn build_cors(cors_config: &config::CorsConfig) -> CorsOptions {
    let is_wildcard = cors_config.allowed_origins.len() == 1 && cors_config.allowed_origins[0] == "*";

    if is_wildcard && cors_config.allow_credentials {
        panic!(
            "Invalid CORS configuration: Cannot use wildcard origins (*) with credentials enabled. \
            Either set specific origins or disable credentials."
        );
    }

    let allowed_origins = if cors_config.allowed_origins.is_empty() {
        AllowedOrigins::some_exact::<&str>(&[])
    } else if is_wildcard {
        AllowedOrigins::all()
    } else {
        AllowedOrigins::some_exact(&cors_config.allowed_origins.iter().map(String::as_str).collect::<Vec<_>>())
    };

    CorsOptions {
        allowed_origins,
        allowed_methods: vec![Method::Get, Method::Post, Method::Put, Method::Delete, Method::Options, Method::Head]
            .into_iter()
            .map(From::from)
            .collect(),
        allowed_headers: rocket_cors::AllowedHeaders::some(&["Content-Type", "Authorization", "Accept"]),
        allow_credentials: cors_config.allow_credentials,
        ..Default::default()
    }
}

fn get_swagger_config(openapi_url: &str) -> SwaggerUIConfig {
    SwaggerUIConfig {
        url: openapi_url.to_string(),
        ..Default::default()
    }
}

fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return config::DEFAULT_API_BASE_PATH.to_string();
    }

    let mut normalized = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    };

    while normalized.ends_with('/') && normalized.len() > 1 {
        normalized.pop();
    }

    normalized
}

fn join_base_path(base_path: &str, path: &str) -> String {
    let base = base_path.trim_end_matches('/');
    let suffix = path.trim_start_matches('/');

    if base.is_empty() {
        format!("/{}", suffix)
    } else {
        format!("{}/{}", base, suffix)
    }
}

struct RouteSpec {
    path: &'static str,
    routes: Vec<rocket::Route>,
    openapi: rocket_okapi::okapi::openapi3::OpenApi,
}

fn collect_route_specs() -> Vec<RouteSpec> {
    let (auth_routes, auth_openapi) = app_routes::auth::routes();
    let (work_log_routes, work_log_openapi) = app_routes::work_log::routes();
    let (report_routes, report_openapi) = app_routes::report::routes();
    let (health_routes, health_openapi) = app_routes::health::routes();

    vec![
        RouteSpec {
            path: "/auth",
            routes: auth_routes,
            openapi: auth_openapi,
        },
        RouteSpec {
            path: "/worklogs",
            routes: work_log_routes,
            openapi: work_log_openapi,
        },
        // `/stats` and `/reports` sit directly under the base path.
        RouteSpec {
            path: "",
            routes: report_routes,
            openapi: report_openapi,
        },
        RouteSpec {
            path: "/health",
            routes: health_routes,
            openapi: health_openapi,
        },
    ]
}

fn mount_api_routes(mut rocket: Rocket<Build>, base_path: &str, enable_swagger: bool) -> Rocket<Build> {
    let route_specs = collect_route_specs();

    if enable_swagger {
        let mut openapi_list = Vec::new();
        for spec in route_specs {
            rocket = rocket.mount(format!("{}{}", base_path, spec.path), spec.routes);
            openapi_list.push((spec.path, spec.openapi));
        }

        let openapi_docs = match marge_spec_list(&openapi_list) {
            Ok(docs) => docs,
            Err(err) => panic!("Could not merge OpenAPI spec: {}", err),
        };

        let settings = rocket_okapi::settings::OpenApiSettings::default();
        rocket = rocket.mount(base_path, vec![get_openapi_route(openapi_docs, &settings)]);

        let docs_path = join_base_path(base_path, "docs");
        let openapi_url = join_base_path(base_path, "openapi.json");
        rocket = rocket.mount(docs_path, make_swagger_ui(&get_swagger_config(&openapi_url)));
    } else {
        for spec in route_specs {
            rocket = rocket.mount(format!("{}{}", base_path, spec.path), spec.routes);
        }
    }

    rocket
}

/// Everything except the store: services, fairings, both surfaces and their catchers.
fn assemble(config: Config) -> Rocket<Build> {
    let cors = build_cors(&config.cors).to_cors().expect("Failed to create CORS fairing");
    let credentials = Credentials::new(&config.password).expect("Invalid password hashing parameters");
    let sessions = SessionAuthenticator::from_config(&config.session);
    let tokens = TokenAuthenticator::from_config(&config.token);

    let figment = rocket::Config::figment()
        .merge(("port", config.server.port))
        .merge(("address", config.server.address.clone()));

    let base_path = normalize_base_path(&config.api.base_path);

    let mut rocket = rocket::custom(figment)
        .attach(cors)
        .attach(RequestLogger)
        .manage(credentials)
        .manage(sessions)
        .manage(tokens);

    rocket = mount_api_routes(rocket, &base_path, config.api.enable_swagger);

    rocket
        .register(
            base_path.as_str(),
            catchers![
                app_routes::error::bad_request,
                app_routes::error::unauthorized,
                app_routes::error::not_found,
                app_routes::error::conflict,
                app_routes::error::unprocessable_entity,
                app_routes::error::internal_error
            ],
        )
        .mount("/", web::routes())
        .register("/", web::catchers())
        .manage(config)
}

pub fn build_rocket(config: Config) -> Rocket<Build> {
    init_tracing(&config.logging.level, config.logging.json_format);
    let profile = active_profile();
    ensure_rocket_secret_key(&profile);
    ensure_token_secret(&profile, &config.token);

    let database = config.database.clone();
    assemble(config).attach(stage_db(database))
}

/// Same instance as [`build_rocket`] over a caller-supplied store.
#[cfg(test)]
pub(crate) fn build_rocket_with_store(config: Config, store: database::postgres_repository::Store) -> Rocket<Build> {
    assemble(config).manage(store)
}
