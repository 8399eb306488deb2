pub mod handlers;
pub mod lifecycle;
pub mod service;
pub mod signature;
pub mod store;
pub mod token;
