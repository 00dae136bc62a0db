//! Business-rule layer between the HTTP handlers and the stores.

pub mod message;
pub mod password;
pub mod person;

pub use message::MessageService;
pub use person::PersonService;
