mod builder;
mod room_command;
mod room_coordinator;
mod room_handle;

pub use builder::*;
pub use room_command::*;
pub use room_coordinator::*;
pub use room_handle::*;
