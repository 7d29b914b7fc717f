pub mod one_time_codes;
pub mod pending_password_resets;
pub mod users;
