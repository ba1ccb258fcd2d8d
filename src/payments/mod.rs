pub mod authorizenet;
pub mod error;
pub mod provider;
pub mod redirect;
pub mod reference;
pub mod signature;
pub mod types;
