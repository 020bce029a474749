pub mod chat;
pub mod query;
pub mod task;
pub mod video;
