pub mod postgres_repository;
pub mod user;
pub mod work_log;
