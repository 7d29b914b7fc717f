pub mod health;
pub mod password;
pub mod profile;
pub mod register;
pub mod token;
