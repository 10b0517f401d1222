//! # Transmitter Capabilities
//!
//! Trait abstractions for the pulse-train transmission hardware and the tick
//! scheduler, so the protocol logic can run and test without a physical
//! peripheral.
//!
//! One scheduler tick corresponds to one millisecond.

use async_trait::async_trait;
use std::time::Instant;

use crate::dshot::protocol::{PulseTrain, CLOCK_DIVIDER};
use crate::error::Result;

/// Hardware configuration of one transmission channel
///
/// DShot requires the line to idle low with no carrier modulation and no
/// hardware looping; [`ChannelConfig::for_dshot`] builds that configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// GPIO pin the signal is emitted on
    pub pin: u8,

    /// Hardware channel index
    pub channel: u8,

    /// Clock divider establishing the protocol tick length
    pub clock_divider: u8,

    /// Line level while no transmission is active (false = low)
    pub idle_high: bool,

    /// Drive the pin while idle
    pub output_enabled: bool,

    /// Modulate the output onto a carrier frequency
    pub carrier_enabled: bool,

    /// Hardware-loop the transmission buffer
    pub loop_enabled: bool,
}

impl ChannelConfig {
    /// Channel configuration for DShot output on the given pin/channel
    pub fn for_dshot(pin: u8, channel: u8) -> Self {
        Self {
            pin,
            channel,
            clock_divider: CLOCK_DIVIDER,
            idle_high: false,
            output_enabled: true,
            carrier_enabled: false,
            loop_enabled: false,
        }
    }
}

/// Trait for pulse-train transmission hardware
///
/// Implementations own a single transmission channel with queue depth one:
/// `transmit` must wait for any in-flight train to finish draining before
/// loading the next, so callers never corrupt in-flight timing data.
#[async_trait]
pub trait PulseTransmitter: Send {
    /// Configure the channel; must succeed before any transmit
    async fn configure(&mut self, config: &ChannelConfig) -> Result<()>;

    /// Emit a pulse train on the configured channel
    ///
    /// With `block` set, returns only once the train is fully emitted;
    /// otherwise returns immediately and lets the hardware drain the buffer.
    async fn transmit(&mut self, train: &PulseTrain, block: bool) -> Result<()>;

    /// Wait until no transmission is in flight
    ///
    /// # Errors
    ///
    /// Returns a transmission error if the channel is still busy after
    /// `timeout_ticks`.
    async fn await_idle(&mut self, timeout_ticks: u64) -> Result<()>;
}

/// Trait for monotonic tick time and thread suspension
#[async_trait]
pub trait Scheduler: Send {
    /// Current monotonic tick count
    fn now_ticks(&self) -> u64;

    /// Suspend the caller for the given tick count
    async fn sleep_ticks(&self, ticks: u64);

    /// Yield the caller for at least one scheduling point
    async fn yield_now(&self);
}

/// Scheduler backed by the tokio runtime
///
/// Ticks are milliseconds measured from construction.
#[derive(Debug)]
pub struct TokioScheduler {
    epoch: Instant,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Scheduler for TokioScheduler {
    fn now_ticks(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    async fn sleep_ticks(&self, ticks: u64) {
        tokio::time::sleep(tokio::time::Duration::from_millis(ticks)).await;
    }

    async fn yield_now(&self) {
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use crate::dshot::encoder;
    use crate::dshot::protocol::{PulseSymbol, FRAME_BITS};
    use crate::error::DshotError;
    use std::sync::{Arc, Mutex};

    /// One recorded transmit call
    #[derive(Debug, Clone)]
    pub struct RecordedTransmit {
        pub train: PulseTrain,
        pub blocking: bool,
    }

    impl RecordedTransmit {
        /// Recover the 16-bit frame from the recorded pulse timings
        pub fn frame(&self) -> u16 {
            let mut frame = 0u16;
            for symbol in &self.train[..FRAME_BITS] {
                frame <<= 1;
                if *symbol == PulseSymbol::ONE {
                    frame |= 1;
                }
            }
            frame
        }

        /// Recover (payload, telemetry) from the recorded pulse timings
        pub fn packet(&self) -> Option<(u16, bool)> {
            encoder::decode_frame(self.frame())
        }
    }

    /// Mock transmitter recording configuration and every pulse train
    #[derive(Clone)]
    pub struct MockTransmitter {
        pub configured: Arc<Mutex<Option<ChannelConfig>>>,
        pub transmits: Arc<Mutex<Vec<RecordedTransmit>>>,
        pub configure_error: Arc<Mutex<bool>>,
        /// Fail the transmit with this index (0-based) and all later ones
        pub fail_transmit_from: Arc<Mutex<Option<usize>>>,
    }

    impl MockTransmitter {
        pub fn new() -> Self {
            Self {
                configured: Arc::new(Mutex::new(None)),
                transmits: Arc::new(Mutex::new(Vec::new())),
                configure_error: Arc::new(Mutex::new(false)),
                fail_transmit_from: Arc::new(Mutex::new(None)),
            }
        }

        pub fn recorded(&self) -> Vec<RecordedTransmit> {
            self.transmits.lock().unwrap().clone()
        }

        /// Decoded (payload, telemetry) pairs of every recorded transmit
        pub fn packets(&self) -> Vec<(u16, bool)> {
            self.recorded()
                .iter()
                .map(|t| t.packet().expect("recorded frame must carry a valid checksum"))
                .collect()
        }

        pub fn set_configure_error(&self) {
            *self.configure_error.lock().unwrap() = true;
        }

        pub fn set_fail_transmit_from(&self, index: usize) {
            *self.fail_transmit_from.lock().unwrap() = Some(index);
        }
    }

    #[async_trait]
    impl PulseTransmitter for MockTransmitter {
        async fn configure(&mut self, config: &ChannelConfig) -> Result<()> {
            if *self.configure_error.lock().unwrap() {
                return Err(DshotError::Configuration("Mock configure error".into()));
            }
            *self.configured.lock().unwrap() = Some(config.clone());
            Ok(())
        }

        async fn transmit(&mut self, train: &PulseTrain, block: bool) -> Result<()> {
            let mut transmits = self.transmits.lock().unwrap();
            if let Some(from) = *self.fail_transmit_from.lock().unwrap() {
                if transmits.len() >= from {
                    return Err(DshotError::Transmission("Mock transmit error".into()));
                }
            }
            transmits.push(RecordedTransmit {
                train: *train,
                blocking: block,
            });
            Ok(())
        }

        async fn await_idle(&mut self, _timeout_ticks: u64) -> Result<()> {
            Ok(())
        }
    }

    /// Mock scheduler over a simulated tick counter
    ///
    /// Time advances only through `sleep_ticks`, so tick-bounded loops run
    /// deterministically in tests.
    #[derive(Clone)]
    pub struct MockScheduler {
        pub ticks: Arc<Mutex<u64>>,
        pub yields: Arc<Mutex<u64>>,
        pub sleeps: Arc<Mutex<Vec<u64>>>,
    }

    impl MockScheduler {
        pub fn new() -> Self {
            Self {
                ticks: Arc::new(Mutex::new(0)),
                yields: Arc::new(Mutex::new(0)),
                sleeps: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn now(&self) -> u64 {
            *self.ticks.lock().unwrap()
        }

        pub fn yield_count(&self) -> u64 {
            *self.yields.lock().unwrap()
        }

        pub fn recorded_sleeps(&self) -> Vec<u64> {
            self.sleeps.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Scheduler for MockScheduler {
        fn now_ticks(&self) -> u64 {
            *self.ticks.lock().unwrap()
        }

        async fn sleep_ticks(&self, ticks: u64) {
            *self.ticks.lock().unwrap() += ticks;
            self.sleeps.lock().unwrap().push(ticks);
        }

        async fn yield_now(&self) {
            *self.yields.lock().unwrap() += 1;
        }
    }
}
