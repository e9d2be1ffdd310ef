//! Panel link: transmitter and shared link state
//!
//! A [`Link`] owns everything both directions of the panel connection
//! share: the write half of the UART (behind the transmit lock), the ACK
//! counter, the last key report, the LED frame, the key-event queue and
//! the one-shot latches.
//!
//! # Delivery
//!
//! Every frame is written, then the transmitter waits for the receiver to
//! count one ACK. A missed ACK triggers a rewrite of the same frame. After
//! `retry_limit` rewrites the link is declared dead with
//! [`LinkError::NoResponse`], which is also published on the fatal signal.
//!
//! The transmit lock is held across write *and* ACK wait, so exactly one
//! frame is ever in flight.
//!
//! # Sharing
//!
//! `ack_count` is only incremented by the receiver and only decremented by
//! the transmitter after observing it at one or more. Both sides go through
//! a blocking mutex, so this holds under any executor, not just a
//! cooperative single-thread one.

use core::cell::RefCell;
use core::future::Future;

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{with_timeout, Instant, Timer};

use kpanel_hal::uart::UartTx;
use kpanel_protocol::{
    classify_received_byte, key_transition, Frame, FrameError, InitStep, LedFlag, LedFrame,
    RxClass, StripeSource, INIT_SEQUENCE, STRIPE_COUNT, STRIPE_HEADERS, STRIPE_LEN,
};

use crate::config::LinkConfig;
use crate::error::LinkError;
use crate::event::{KeyEvent, KEY_QUEUE_DEPTH};
use crate::latch::Latch;

/// Diagnostics counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    /// ACK bytes received
    pub acks: u32,
    /// Frame rewrites after an ACK timeout
    pub retries: u32,
    /// `0x40` status bytes discarded
    pub ignored_status: u32,
    /// Scan code changes seen
    pub key_reports: u32,
    /// Key events lost to a full queue
    pub dropped_events: u32,
    /// Frames delivered and acknowledged
    pub frames_sent: u32,
    /// Failed UART status or byte reads
    pub rx_errors: u32,
}

struct LinkState {
    ack_count: u16,
    last_report: u8,
    led: LedFrame,
    stats: LinkStats,
}

/// Shared state of one panel link
///
/// `Q` is the key-event queue depth.
pub struct Link<M: RawMutex, T: UartTx, const Q: usize = KEY_QUEUE_DEPTH> {
    config: LinkConfig,
    tx: Mutex<M, T>,
    state: BlockingMutex<M, RefCell<LinkState>>,
    ack: Signal<M, ()>,
    events: Channel<M, KeyEvent, Q>,
    started: Latch<M>,
    initialized: Latch<M>,
    shutdown: Latch<M>,
    fatal: Signal<M, LinkError>,
}

impl<M: RawMutex, T: UartTx, const Q: usize> Link<M, T, Q> {
    /// Create a link around the write half of the UART
    pub fn new(tx: T, config: LinkConfig) -> Self {
        Self {
            config,
            tx: Mutex::new(tx),
            state: BlockingMutex::new(RefCell::new(LinkState {
                ack_count: 0,
                last_report: config.idle_code,
                led: LedFrame::new(),
                stats: LinkStats::default(),
            })),
            ack: Signal::new(),
            events: Channel::new(),
            started: Latch::new(),
            initialized: Latch::new(),
            shutdown: Latch::new(),
            fatal: Signal::new(),
        }
    }

    /// Link timing in use
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    // ---- transmit side -------------------------------------------------

    /// Send one 2- or 196-byte frame and wait for its ACK
    pub async fn send(&self, bytes: &[u8]) -> Result<(), LinkError> {
        let frame = Frame::from_slice(bytes)?;
        self.send_frame(frame).await
    }

    /// Send an already validated frame and wait for its ACK
    pub async fn send_frame(&self, frame: Frame<'_>) -> Result<(), LinkError> {
        self.guarded(async {
            let mut tx = self.tx.lock().await;
            self.transmit(&mut tx, frame).await
        })
        .await
    }

    /// Send one display stripe: its header frame, then its pixels
    ///
    /// Both frames go out under one lock acquisition, so no other producer
    /// can slip a frame between them.
    pub async fn send_stripe(
        &self,
        index: usize,
        pixels: &[u8; STRIPE_LEN],
    ) -> Result<(), LinkError> {
        let header = *STRIPE_HEADERS
            .get(index)
            .ok_or(FrameError::StripeOutOfRange)?;

        self.guarded(async {
            let mut tx = self.tx.lock().await;
            self.transmit(&mut tx, Frame::Command(header)).await?;
            self.transmit(&mut tx, Frame::Stripe(pixels)).await
        })
        .await
    }

    /// Re-encode and send all five stripes of a frame buffer
    pub async fn refresh_display<S: StripeSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<(), LinkError> {
        for index in 0..STRIPE_COUNT {
            let stripe = source.stripe(index)?;
            self.send_stripe(index, &stripe).await?;
        }
        trace!("Display refreshed");
        Ok(())
    }

    /// Light or darken an LED and send the resulting LED-state frame
    pub async fn set_led(&self, flag: LedFlag, lit: bool) -> Result<(), LinkError> {
        self.guarded(async {
            let mut tx = self.tx.lock().await;
            let bytes = self.state.lock(|state| {
                let mut state = state.borrow_mut();
                state.led.set(flag, lit);
                state.led.bytes()
            });
            self.transmit(&mut tx, Frame::Command(bytes)).await
        })
        .await
    }

    /// Current LED-state frame
    pub fn led_frame(&self) -> LedFrame {
        self.state.lock(|state| state.borrow().led)
    }

    /// Send the power-up command table, honouring its pauses
    ///
    /// The transmit lock is held for the whole table. The init-complete
    /// latch is set only if every command was acknowledged.
    pub async fn run_init_sequence(&self) -> Result<(), LinkError> {
        self.guarded(async {
            let mut tx = self.tx.lock().await;
            let total = INIT_SEQUENCE.len();
            for (step_index, step) in INIT_SEQUENCE.iter().enumerate() {
                match *step {
                    InitStep::Pause(ms) => Timer::after_millis(u64::from(ms)).await,
                    InitStep::Send(bytes) => {
                        debug!(
                            "Init step {}/{}: {:02x} {:02x}",
                            step_index + 1,
                            total,
                            bytes[0],
                            bytes[1]
                        );
                        self.transmit(&mut tx, Frame::Command(bytes)).await?;
                    }
                }
            }
            Ok(())
        })
        .await?;

        self.initialized.set();
        info!("Init sequence complete");
        Ok(())
    }

    /// Write one frame and wait for its ACK, retrying on timeout
    ///
    /// Caller must hold the transmit lock.
    async fn transmit(&self, tx: &mut T, frame: Frame<'_>) -> Result<(), LinkError> {
        let bytes = frame.as_bytes();
        let attempts = self.config.max_attempts();

        for attempt in 1..=attempts {
            let written = tx.write(bytes).map_err(|_| {
                error!("UART write failed");
                LinkError::Transport
            })?;

            if written != bytes.len() {
                error!("Short write: {} of {} bytes", written, bytes.len());
                return Err(LinkError::ShortWrite {
                    expected: bytes.len(),
                    written,
                });
            }

            match with_timeout(self.config.ack_timeout, self.take_ack()).await {
                Ok(()) => {
                    self.with_stats(|stats| stats.frames_sent += 1);
                    return Ok(());
                }
                Err(_) => {
                    warn!("ACK timeout (attempt {}/{})", attempt, attempts);
                    if attempt < attempts {
                        self.with_stats(|stats| stats.retries += 1);
                    }
                }
            }
        }

        error!("Panel not responding after {} attempts", attempts);
        let err = LinkError::NoResponse { attempts };
        self.fatal.signal(err);
        Err(err)
    }

    /// Wait for `ack_count >= 1`, then consume one ACK
    async fn take_ack(&self) {
        loop {
            let taken = self.state.lock(|state| {
                let mut state = state.borrow_mut();
                if state.ack_count > 0 {
                    state.ack_count -= 1;
                    true
                } else {
                    false
                }
            });
            if taken {
                return;
            }
            self.ack.wait().await;
        }
    }

    /// Run `fut` unless or until the link is shut down
    async fn guarded<F>(&self, fut: F) -> Result<(), LinkError>
    where
        F: Future<Output = Result<(), LinkError>>,
    {
        if self.shutdown.is_set() {
            return Err(LinkError::Shutdown);
        }
        match select(self.shutdown.wait(), fut).await {
            Either::First(()) => Err(LinkError::Shutdown),
            Either::Second(result) => result,
        }
    }

    // ---- receive side --------------------------------------------------

    /// Account for one byte read from the controller
    ///
    /// Called by the receiver for every byte, in order.
    pub fn process_byte(&self, byte: u8) -> RxClass {
        if !self.started.is_set() {
            info!("First byte from panel: {:02x}", byte);
            self.started.set();
        }

        let idle_code = self.config.idle_code;
        let now = Instant::now();

        let (class, transition) = self.state.lock(|state| {
            let mut state = state.borrow_mut();
            let class = classify_received_byte(byte, state.last_report);
            let mut transition = None;

            match class {
                RxClass::Ack => {
                    state.ack_count = state.ack_count.saturating_add(1);
                    state.stats.acks += 1;
                }
                RxClass::IgnoredStatus => state.stats.ignored_status += 1,
                RxClass::Unchanged => {}
                RxClass::KeyReport(code) => {
                    transition = Some(key_transition(state.last_report, code, idle_code));
                    state.last_report = code;
                    state.stats.key_reports += 1;
                }
            }
            (class, transition)
        });

        match class {
            RxClass::Ack => {
                trace!("ACK");
                self.ack.signal(());
            }
            RxClass::IgnoredStatus => trace!("Status byte ignored"),
            RxClass::Unchanged => {}
            RxClass::KeyReport(code) => debug!("Key report {:02x}", code),
        }

        if let Some(transition) = transition {
            if let Some(code) = transition.release {
                self.enqueue(KeyEvent::release(code, now));
            }
            if let Some(code) = transition.press {
                self.enqueue(KeyEvent::press(code, now));
            }
        }

        class
    }

    /// Count one failed UART read, returning the running total
    pub fn record_rx_error(&self) -> u32 {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            state.stats.rx_errors = state.stats.rx_errors.saturating_add(1);
            state.stats.rx_errors
        })
    }

    fn enqueue(&self, event: KeyEvent) {
        if self.events.try_send(event).is_err() {
            warn!("Key queue full, dropping event for {:02x}", event.scan_code);
            self.with_stats(|stats| stats.dropped_events += 1);
        }
    }

    // ---- application side ----------------------------------------------

    /// Pop the oldest key event, if any
    pub fn get_key_event(&self) -> Option<KeyEvent> {
        self.events.try_receive().ok()
    }

    /// Wait for the next key event
    pub async fn next_key_event(&self) -> KeyEvent {
        self.events.receive().await
    }

    /// Snapshot of the diagnostics counters
    pub fn stats(&self) -> LinkStats {
        self.state.lock(|state| state.borrow().stats)
    }

    /// ACKs received but not yet consumed by the transmitter
    pub fn pending_acks(&self) -> u16 {
        self.state.lock(|state| state.borrow().ack_count)
    }

    /// Most recent scan code reported by the controller
    pub fn last_report(&self) -> u8 {
        self.state.lock(|state| state.borrow().last_report)
    }

    /// Wait for the first byte from the controller
    pub async fn wait_started(&self) {
        self.started.wait().await
    }

    /// Whether the controller has sent anything yet
    pub fn is_started(&self) -> bool {
        self.started.is_set()
    }

    /// Wait for the init sequence to finish
    pub async fn wait_initialized(&self) {
        self.initialized.wait().await
    }

    /// Whether the init sequence has finished
    pub fn is_initialized(&self) -> bool {
        self.initialized.is_set()
    }

    /// Wait for a fatal link error
    pub async fn wait_fatal(&self) -> LinkError {
        self.fatal.wait().await
    }

    /// Take a pending fatal link error without waiting
    pub fn take_fatal(&self) -> Option<LinkError> {
        self.fatal.try_take()
    }

    /// Stop the receiver and abandon every pending send
    pub fn shutdown(&self) {
        self.shutdown.set();
    }

    /// Whether [`Link::shutdown`] has been called
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_set()
    }

    /// Wait for shutdown
    pub async fn wait_shutdown(&self) {
        self.shutdown.wait().await
    }

    fn with_stats(&self, f: impl FnOnce(&mut LinkStats)) {
        self.state.lock(|state| f(&mut state.borrow_mut().stats));
    }
}
