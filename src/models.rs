pub mod report;
pub mod session;
pub mod user;
pub mod work_log;
