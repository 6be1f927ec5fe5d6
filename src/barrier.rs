//! Two-party ready barrier.
//!
//! Each match generation gets its own `watch` channel. Both parties signal
//! once; waiters are released together when the second signal lands. A
//! reset or abort closes out the old generation so a waiter from a previous
//! match can never be released by signals of the next one.

use core::fmt;

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Local,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BarrierError {
    /// This party already signalled in the current generation.
    AlreadySignalled(Party),
    /// The generation was aborted before both parties arrived.
    Broken,
}

impl fmt::Display for BarrierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BarrierError::AlreadySignalled(p) => write!(f, "{:?} side already signalled ready", p),
            BarrierError::Broken => write!(f, "Ready barrier was aborted"),
        }
    }
}

impl std::error::Error for BarrierError {}

#[derive(Debug, Clone, Copy, Default)]
struct Arrivals {
    local: bool,
    remote: bool,
    aborted: bool,
}

impl Arrivals {
    fn released(&self) -> bool {
        self.local && self.remote
    }

    fn arrived(&self, party: Party) -> bool {
        match party {
            Party::Local => self.local,
            Party::Remote => self.remote,
        }
    }
}

#[derive(Debug)]
pub struct ReadyBarrier {
    generation: u64,
    tx: watch::Sender<Arrivals>,
}

impl ReadyBarrier {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Arrivals::default());
        Self { generation: 0, tx }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Record `party` as ready. Returns `true` if this signal released the
    /// barrier.
    pub fn signal(&self, party: Party) -> Result<bool, BarrierError> {
        let mut result = Ok(false);
        self.tx.send_modify(|a| {
            if a.aborted {
                result = Err(BarrierError::Broken);
                return;
            }
            if a.arrived(party) {
                result = Err(BarrierError::AlreadySignalled(party));
                return;
            }
            match party {
                Party::Local => a.local = true,
                Party::Remote => a.remote = true,
            }
            result = Ok(a.released());
        });
        result
    }

    pub fn has_signalled(&self, party: Party) -> bool {
        self.tx.borrow().arrived(party)
    }

    pub fn is_released(&self) -> bool {
        self.tx.borrow().released()
    }

    /// A handle that blocks until this generation is released or broken.
    pub fn waiter(&self) -> ReadyWaiter {
        ReadyWaiter {
            generation: self.generation,
            rx: self.tx.subscribe(),
        }
    }

    /// Break the current generation. Blocked waiters get
    /// [`BarrierError::Broken`]. Has no effect once released.
    pub fn abort(&self) {
        self.tx.send_if_modified(|a| {
            if a.aborted || a.released() {
                return false;
            }
            a.aborted = true;
            true
        });
    }

    /// Close out the current generation and start a fresh one.
    pub fn reset(&mut self) {
        self.abort();
        let (tx, _) = watch::channel(Arrivals::default());
        self.tx = tx;
        self.generation += 1;
    }
}

impl Default for ReadyBarrier {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ReadyWaiter {
    generation: u64,
    rx: watch::Receiver<Arrivals>,
}

impl ReadyWaiter {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Block until both parties signalled. A dropped or aborted barrier
    /// yields `Broken`; it never hangs.
    pub async fn wait(&mut self) -> Result<u64, BarrierError> {
        let arrivals = self
            .rx
            .wait_for(|a| a.released() || a.aborted)
            .await
            .map_err(|_| BarrierError::Broken)?;
        if arrivals.released() {
            Ok(self.generation)
        } else {
            Err(BarrierError::Broken)
        }
    }
}
