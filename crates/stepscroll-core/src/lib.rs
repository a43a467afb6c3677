pub mod config;
pub mod error;
pub mod navigation;

pub use config::{AppConfig, EasingType, ScrollConfig};
pub use error::{Error, Result};
pub use navigation::{
    NavigationOutcome, Navigator, NavigatorCommand, NavigatorEvent, NavigatorService, Origin,
    RawInput, ScrollController,
};
