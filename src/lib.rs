mod assets;
pub mod catalog;
pub mod config;
pub mod tokens;
pub mod workshop;

pub use assets::AssetError;
pub use catalog::Catalog;
pub use config::{TokenBuildConfig, WorkshopConfig};
pub use workshop::Workshop;
