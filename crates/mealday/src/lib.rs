mod command;
mod form;
mod query;
mod service;
mod types;

pub use command::*;
pub use form::*;
pub use query::*;
pub use service::*;
pub use types::*;
