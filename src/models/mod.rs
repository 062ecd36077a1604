pub mod file;
pub mod user;
