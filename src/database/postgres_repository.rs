use crate::database::user::UserRepository;
use crate::database::work_log::WorkLogRepository;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct PostgresRepository {
    pub pool: PgPool,
}

/// Everything the handlers need from persistence.
pub trait Repository: UserRepository + WorkLogRepository + Send + Sync {}

impl<T: UserRepository + WorkLogRepository + Send + Sync> Repository for T {}

/// Shared store handle kept in Rocket state. Tests swap in an in-memory store.
pub type Store = Arc<dyn Repository>;
