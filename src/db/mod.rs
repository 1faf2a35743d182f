pub mod access_tokens;
pub mod leaves;
pub mod users;
