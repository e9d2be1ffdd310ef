//! Embassy async tasks
//!
//! Each task runs independently and communicates through the panel link
//! and the statics in `channels`.

pub mod blinker;
pub mod display;
pub mod keys;
pub mod receiver;
pub mod session;
pub mod stats;

pub use blinker::blinker_task;
pub use display::display_task;
pub use keys::keys_task;
pub use receiver::receiver_task;
pub use session::session_task;
pub use stats::stats_task;
