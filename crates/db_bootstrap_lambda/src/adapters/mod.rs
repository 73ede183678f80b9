pub mod data_api;
pub mod secret_store;
pub mod sql_session;
