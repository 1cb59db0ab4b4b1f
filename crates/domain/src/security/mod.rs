pub mod password;
pub mod secrets;
