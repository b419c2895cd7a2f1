pub mod date;
pub mod profile;
