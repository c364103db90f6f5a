pub mod chat;
pub mod study;
