//! Session controller
//!
//! Takes the controller from power-on to a usable link:
//!
//! ```text
//! Reset ──ResetReleased──► AwaitFirstByte ──FirstByte──► Initializing
//!                                                            │
//!                                                      InitComplete
//!                                                            ▼
//!          ShuttingDown ◄──────── Fatal / Shutdown ──────── Ready
//! ```
//!
//! The chip has no reset command, so Reset is a soft power cycle on the
//! enable line. It also ignores commands until it has sent its first
//! byte, which is why the init table waits for the receiver's startup
//! latch.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{Duration, Timer};

use kpanel_hal::gpio::OutputPin;
use kpanel_hal::uart::UartTx;

use crate::config::MIN_RESET_HOLD_MS;
use crate::error::LinkError;
use crate::link::Link;

/// Session states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// Enable line low, chip held off
    Reset,
    /// Chip released, waiting for it to speak
    AwaitFirstByte,
    /// Sending the power-up command table
    Initializing,
    /// Producers may use the link
    Ready,
    /// Enable line low, receiver cancelled; terminal
    ShuttingDown,
}

/// Events that move the session along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionEvent {
    /// Enable line driven high after the reset hold
    ResetReleased,
    /// Receiver saw the first byte
    FirstByte,
    /// Every init command was acknowledged
    InitComplete,
    /// Link declared dead
    Fatal,
    /// Shutdown requested
    Shutdown,
}

impl SessionState {
    /// Next state for an event; events that make no sense here are ignored
    pub fn transition(self, event: SessionEvent) -> Self {
        use SessionEvent::*;
        use SessionState::*;

        match (self, event) {
            (ShuttingDown, _) => ShuttingDown,
            (_, Fatal) | (_, Shutdown) => ShuttingDown,

            (Reset, ResetReleased) => AwaitFirstByte,
            (AwaitFirstByte, FirstByte) => Initializing,
            (Initializing, InitComplete) => Ready,

            (state, _) => state,
        }
    }

    /// Whether producers may send
    pub fn is_ready(&self) -> bool {
        matches!(self, SessionState::Ready)
    }

    /// Whether the session can no longer make progress
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::ShuttingDown)
    }
}

/// Drives one link through its lifecycle
pub struct Session<'a, M: RawMutex, T: UartTx, P: OutputPin, const Q: usize> {
    link: &'a Link<M, T, Q>,
    enable: P,
    state: SessionState,
}

impl<'a, M, T, P, const Q: usize> Session<'a, M, T, P, Q>
where
    M: RawMutex,
    T: UartTx,
    P: OutputPin,
{
    pub fn new(link: &'a Link<M, T, Q>, enable: P) -> Self {
        Self {
            link,
            enable,
            state: SessionState::Reset,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn link(&self) -> &'a Link<M, T, Q> {
        self.link
    }

    /// Reset the chip and run the init table
    ///
    /// On success the session is `Ready` and the init-complete latch is
    /// set. On any failure the session shuts down before returning.
    pub async fn bring_up(&mut self) -> Result<(), LinkError> {
        let link = self.link;
        let result = match select(link.wait_shutdown(), self.bring_up_steps()).await {
            Either::First(()) => Err(LinkError::Shutdown),
            Either::Second(result) => result,
        };

        if let Err(e) = result {
            error!("Bring-up failed: {}", e);
            let event = match e {
                LinkError::Shutdown => SessionEvent::Shutdown,
                _ => SessionEvent::Fatal,
            };
            self.advance(event);
            self.power_down();
        }
        result
    }

    async fn bring_up_steps(&mut self) -> Result<(), LinkError> {
        let hold = self
            .link
            .config()
            .reset_hold
            .max(Duration::from_millis(MIN_RESET_HOLD_MS));

        self.enable.set_low();
        Timer::after(hold).await;
        self.enable.set_high();
        self.advance(SessionEvent::ResetReleased);

        self.link.wait_started().await;
        self.advance(SessionEvent::FirstByte);

        self.link.run_init_sequence().await?;
        self.advance(SessionEvent::InitComplete);
        Ok(())
    }

    /// Drive the enable line low and cancel the receiver
    ///
    /// Pending sends are abandoned with [`LinkError::Shutdown`].
    pub fn shutdown(&mut self) {
        self.advance(SessionEvent::Shutdown);
        self.power_down();
    }

    /// Wait for a fatal link error, then shut down
    pub async fn supervise(&mut self) -> LinkError {
        let err = self.link.wait_fatal().await;
        error!("Link lost: {}", err);
        self.advance(SessionEvent::Fatal);
        self.power_down();
        err
    }

    fn power_down(&mut self) {
        self.enable.set_low();
        self.link.shutdown();
    }

    fn advance(&mut self, event: SessionEvent) {
        let next = self.state.transition(event);
        if next != self.state {
            info!("Session {} -> {}", self.state, next);
            self.state = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{drive, AckPolicy, MockPin, PanelSim};
    use embassy_futures::block_on;
    use embassy_futures::join::join;
    use embassy_futures::yield_now;
    use kpanel_protocol::commands::init_commands;
    use proptest::prelude::*;

    use SessionEvent::*;
    use SessionState::*;

    #[test]
    fn test_happy_path_transitions() {
        let state = Reset
            .transition(ResetReleased)
            .transition(FirstByte)
            .transition(InitComplete);
        assert_eq!(state, Ready);
        assert!(state.is_ready());
    }

    #[test]
    fn test_out_of_order_events_ignored() {
        assert_eq!(Reset.transition(FirstByte), Reset);
        assert_eq!(Reset.transition(InitComplete), Reset);
        assert_eq!(AwaitFirstByte.transition(InitComplete), AwaitFirstByte);
        assert_eq!(Ready.transition(ResetReleased), Ready);
    }

    #[test]
    fn test_fatal_from_any_state() {
        for state in [Reset, AwaitFirstByte, Initializing, Ready] {
            assert_eq!(state.transition(Fatal), ShuttingDown);
            assert_eq!(state.transition(Shutdown), ShuttingDown);
        }
    }

    fn any_event() -> impl Strategy<Value = SessionEvent> {
        prop_oneof![
            Just(ResetReleased),
            Just(FirstByte),
            Just(InitComplete),
            Just(Fatal),
            Just(Shutdown),
        ]
    }

    proptest! {
        #[test]
        fn prop_shutting_down_is_absorbing(events in proptest::collection::vec(any_event(), 0..20)) {
            let mut state = ShuttingDown;
            for event in events {
                state = state.transition(event);
            }
            prop_assert!(state.is_terminal());
        }
    }

    #[test]
    fn test_bring_up_resets_then_initializes() {
        let sim = PanelSim::new(AckPolicy::Always);
        let link = sim.link();
        let pin = sim.enable_pin();
        let mut session = Session::new(&link, pin.clone());

        let result = drive(&link, &sim, session.bring_up());

        assert_eq!(result, Ok(()));
        assert_eq!(session.state(), Ready);
        assert_eq!(pin.levels(), vec![false, true]);
        assert!(link.is_started());
        assert!(link.is_initialized());

        let expected: Vec<Vec<u8>> = init_commands().map(|c| c.to_vec()).collect();
        assert_eq!(sim.writes(), expected);
        // The pre-init "80 40" idle report produced no key events
        assert_eq!(link.get_key_event(), None);
    }

    #[test]
    fn test_bring_up_failure_shuts_down() {
        let sim = PanelSim::new(AckPolicy::Never);
        let link = sim.link();
        let pin = sim.enable_pin();
        let mut session = Session::new(&link, pin.clone());

        let result = drive(&link, &sim, session.bring_up());

        assert_eq!(result, Err(LinkError::NoResponse { attempts: 17 }));
        assert_eq!(session.state(), ShuttingDown);
        assert_eq!(pin.levels(), vec![false, true, false]);
        assert!(link.is_shut_down());
        assert!(!link.is_initialized());
    }

    #[test]
    fn test_shutdown_while_waiting_for_first_byte() {
        let sim = PanelSim::new(AckPolicy::Always);
        let link = sim.link();
        // Plain pin: the controller never starts talking
        let pin = MockPin::default();
        let mut session = Session::new(&link, pin.clone());

        let (result, _) = block_on(join(session.bring_up(), async {
            yield_now().await;
            link.shutdown();
        }));

        assert_eq!(result, Err(LinkError::Shutdown));
        assert_eq!(session.state(), ShuttingDown);
        assert!(pin.is_set_low());
        assert!(sim.writes().is_empty());
    }

    #[test]
    fn test_explicit_shutdown() {
        let sim = PanelSim::new(AckPolicy::Always);
        let link = sim.link();
        let pin = sim.enable_pin();
        let mut session = Session::new(&link, pin.clone());

        session.shutdown();

        assert_eq!(session.state(), ShuttingDown);
        assert_eq!(pin.levels(), vec![false]);
        assert_eq!(
            block_on(link.send(&[0x0E, 0xFD])),
            Err(LinkError::Shutdown)
        );
    }

    #[test]
    fn test_supervisor_observes_fatal_error() {
        let sim = PanelSim::new(AckPolicy::Never);
        let link = sim.link();
        let pin = MockPin::default();
        let mut session = Session::new(&link, pin.clone());

        let (err, sent) = drive(
            &link,
            &sim,
            join(session.supervise(), link.send(&[0x0E, 0xFD])),
        );

        assert_eq!(err, LinkError::NoResponse { attempts: 17 });
        assert_eq!(sent, Err(err));
        assert_eq!(session.state(), ShuttingDown);
        assert_eq!(pin.levels(), vec![false]);
        assert!(link.is_shut_down());
    }
}
