pub mod flash;
pub mod posts;
pub mod users;
