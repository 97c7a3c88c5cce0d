pub mod http;
pub mod jwt;
pub mod mock;
pub mod postgres;
pub mod redis;
