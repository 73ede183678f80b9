pub mod driver;
pub mod proxy;
