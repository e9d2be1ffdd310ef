//! Shared state between Embassy tasks
//!
//! The link itself lives in a `StaticCell` (it owns the UART), everything
//! the application draws into is a plain static here.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;

use kpanel_core::event::KEY_QUEUE_DEPTH;
use kpanel_core::{Link, Receiver};
use kpanel_hal_rp2040::{PanelRx, PanelTx};
use kpanel_protocol::FrameBuffer;

/// The panel link as used on target
pub type PanelLink = Link<CriticalSectionRawMutex, PanelTx>;

/// Receiver bound to [`PanelLink`]
pub type PanelReceiver =
    Receiver<'static, CriticalSectionRawMutex, PanelTx, PanelRx, KEY_QUEUE_DEPTH>;

/// What the LCD should show
pub static FRAME: Mutex<CriticalSectionRawMutex, FrameBuffer> = Mutex::new(FrameBuffer::new());

/// Signal that [`FRAME`] changed and should be sent now
pub static FRAME_CHANGED: Signal<CriticalSectionRawMutex, ()> = Signal::new();
