pub mod basic;
pub(crate) mod extractors;
pub mod password;
pub mod services;
