mod media;
mod negotiation_state;
mod peer_link;
mod rtc_link;
mod session;
mod silent_capture;

pub use media::*;
pub use negotiation_state::*;
pub use peer_link::*;
pub use rtc_link::*;
pub use session::*;
pub use silent_capture::*;
