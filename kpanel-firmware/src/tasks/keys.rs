//! Key event consumer
//!
//! Logs every key event and shows the held key's scan code on the LCD.

use core::fmt::Write;

use defmt::*;
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;
use heapless::String;

use crate::channels::{PanelLink, FRAME, FRAME_CHANGED};

/// Where the scan code is drawn (baseline of the first text line)
const TEXT_ORIGIN: Point = Point::new(4, 12);

#[embassy_executor::task]
pub async fn keys_task(link: &'static PanelLink) {
    info!("Keys task started");

    show(None).await;

    loop {
        let event = link.next_key_event().await;
        if event.is_release() {
            info!("Key {=u8:02x} released", event.scan_code);
            show(None).await;
        } else {
            info!("Key {=u8:02x} pressed", event.scan_code);
            show(Some(event.scan_code)).await;
        }
    }
}

/// Redraw the frame buffer for the held key (or none) and request a refresh
async fn show(scan_code: Option<u8>) {
    let mut text: String<24> = String::new();
    let _ = match scan_code {
        Some(code) => write!(text, "Key 0x{:02X}", code),
        None => write!(text, "No key"),
    };

    let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
    {
        let mut frame = FRAME.lock().await;
        frame.clear();
        // Drawing into the frame buffer is infallible
        let _ = Text::new(&text, TEXT_ORIGIN, style).draw(&mut *frame);
    }
    FRAME_CHANGED.signal(());
}
