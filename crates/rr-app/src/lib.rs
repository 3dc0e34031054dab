pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod generator;
pub mod ui;

pub use config::AppConfig;
pub use error::{ApiError, AppError};
pub use events::AppEvent;
pub use generator::Generator;
