pub mod auth;
pub mod markup;
pub mod media;
pub mod posts;
pub mod user;
