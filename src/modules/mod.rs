pub mod auth;
pub mod chat;
pub mod donations;
pub mod followers;
pub mod streamers;
pub mod streams;
pub mod users;
