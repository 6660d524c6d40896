mod membership;
mod room_state;

pub use membership::*;
pub use room_state::*;
