pub mod events;
pub mod models;
pub mod services;

pub use events::*;
pub use models::*;
pub use services::*;
