pub mod app;
pub mod config;
pub mod room;
pub mod signaling;

pub use app::*;
pub use config::*;
pub use room::*;
pub use signaling::*;
