pub mod clock;
pub mod message;
pub mod models;
pub mod validation;
