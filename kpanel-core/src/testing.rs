//! Host-side panel simulator for tests
//!
//! [`PanelSim`] hands out a write half that records every frame and,
//! according to its [`AckPolicy`], queues an ACK byte on the read half.
//! Both halves share one state so a test can script the controller.

use core::cell::RefCell;
use core::future::Future;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embassy_futures::block_on;
use embassy_futures::join::join;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_time::Duration;

use kpanel_hal::gpio::OutputPin;
use kpanel_hal::uart::{UartRx, UartTx};
use kpanel_protocol::commands::ACK;

use crate::config::LinkConfig;
use crate::link::Link;
use crate::receiver::Receiver;

/// Link wired to a simulated panel
pub type TestLink = Link<NoopRawMutex, MockTx>;

/// When the simulated controller acknowledges a frame
#[derive(Debug, Clone, Copy)]
pub enum AckPolicy {
    /// Every frame
    Always,
    /// No frame at all
    Never,
    /// Ignore the first `n` writes, then acknowledge everything
    DropFirst(usize),
    /// Acknowledge the first `n` writes, then go silent
    First(usize),
}

struct SimState {
    policy: AckPolicy,
    writes: Vec<Vec<u8>>,
    rx: VecDeque<u8>,
    write_limit: Option<usize>,
    fail_writes: bool,
    failing_reads: usize,
}

/// Scripted panel controller
#[derive(Clone)]
pub struct PanelSim {
    state: Rc<RefCell<SimState>>,
}

impl PanelSim {
    pub fn new(policy: AckPolicy) -> Self {
        Self {
            state: Rc::new(RefCell::new(SimState {
                policy,
                writes: Vec::new(),
                rx: VecDeque::new(),
                write_limit: None,
                fail_writes: false,
                failing_reads: 0,
            })),
        }
    }

    pub fn tx(&self) -> MockTx {
        MockTx {
            state: self.state.clone(),
        }
    }

    pub fn rx(&self) -> MockRx {
        MockRx {
            state: self.state.clone(),
        }
    }

    /// Enable line that makes the controller start talking when released
    pub fn enable_pin(&self) -> MockPin {
        MockPin {
            levels: Rc::default(),
            sim: Some(self.state.clone()),
        }
    }

    /// A link with [`test_config`] writing into this simulator
    pub fn link(&self) -> TestLink {
        Link::new(self.tx(), test_config())
    }

    /// Frames written so far, one entry per write call
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state.borrow().writes.clone()
    }

    /// Queue bytes as if the controller sent them
    pub fn feed(&self, bytes: &[u8]) {
        self.state.borrow_mut().rx.extend(bytes.iter().copied());
    }

    /// Bytes queued but not yet read
    pub fn pending_rx(&self) -> usize {
        self.state.borrow().rx.len()
    }

    /// Accept at most `limit` bytes per write
    pub fn limit_writes(&self, limit: usize) {
        self.state.borrow_mut().write_limit = Some(limit);
    }

    /// Make every write report a driver error
    pub fn fail_writes(&self) {
        self.state.borrow_mut().fail_writes = true;
    }

    /// Make the next `count` reads report a driver error
    pub fn fail_next_reads(&self, count: usize) {
        self.state.borrow_mut().failing_reads = count;
    }
}

/// Driver error raised by the mocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

pub struct MockTx {
    state: Rc<RefCell<SimState>>,
}

impl UartTx for MockTx {
    type Error = MockError;

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        let mut state = self.state.borrow_mut();
        if state.fail_writes {
            return Err(MockError);
        }

        let accepted = state.write_limit.map_or(data.len(), |l| l.min(data.len()));
        state.writes.push(data[..accepted].to_vec());
        if accepted < data.len() {
            return Ok(accepted);
        }

        let ack = match &mut state.policy {
            AckPolicy::Always => true,
            AckPolicy::Never => false,
            AckPolicy::DropFirst(0) => true,
            AckPolicy::DropFirst(n) => {
                *n -= 1;
                false
            }
            AckPolicy::First(0) => false,
            AckPolicy::First(n) => {
                *n -= 1;
                true
            }
        };
        if ack {
            state.rx.push_back(ACK);
        }
        Ok(accepted)
    }
}

pub struct MockRx {
    state: Rc<RefCell<SimState>>,
}

impl UartRx for MockRx {
    type Error = MockError;

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        Ok(self.state.borrow().rx.len())
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let mut state = self.state.borrow_mut();
        if state.failing_reads > 0 {
            state.failing_reads -= 1;
            return Err(MockError);
        }
        state.rx.pop_front().ok_or(MockError)
    }
}

/// Write half that swallows everything, for receive-only tests
pub struct NullTx;

impl UartTx for NullTx {
    type Error = MockError;

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        Ok(data.len())
    }
}

/// Enable line that remembers every level it was driven to
#[derive(Clone, Default)]
pub struct MockPin {
    levels: Rc<RefCell<Vec<bool>>>,
    sim: Option<Rc<RefCell<SimState>>>,
}

impl MockPin {
    pub fn levels(&self) -> Vec<bool> {
        self.levels.borrow().clone()
    }
}

impl OutputPin for MockPin {
    fn set_high(&mut self) {
        self.levels.borrow_mut().push(true);
        if let Some(sim) = &self.sim {
            // Pre-init idle report
            sim.borrow_mut().rx.extend([0x80, 0x40]);
        }
    }

    fn set_low(&mut self) {
        self.levels.borrow_mut().push(false);
    }

    fn is_set_high(&self) -> bool {
        self.levels.borrow().last().copied().unwrap_or(false)
    }
}

/// Default link timing with the shortest legal reset hold
pub fn test_config() -> LinkConfig {
    LinkConfig {
        reset_hold: Duration::from_millis(250),
        ..LinkConfig::default()
    }
}

/// Run `scenario` with a receiver draining the simulator, then shut down
pub fn drive<Fut: Future>(link: &TestLink, sim: &PanelSim, scenario: Fut) -> Fut::Output {
    let mut receiver = Receiver::new(link, sim.rx());
    block_on(async {
        let (_, output) = join(receiver.run(), async {
            let output = scenario.await;
            link.shutdown();
            output
        })
        .await;
        output
    })
}
