//! # Protocol Controller Module
//!
//! Stateful DShot protocol driver.
//!
//! This module handles:
//! - Channel installation and release
//! - The ESC bring-up sequence (reset frames + arming delay)
//! - Throttle transmission with range validation
//! - The direction-reversal handshake
//! - Command issuance honoring each command's timing contract
//!
//! A controller drives exactly one channel and performs no internal locking;
//! concurrent calls against one instance must be serialized by the caller.

use tracing::{debug, info};

use crate::config::EscConfig;
use crate::dshot::encoder::{encode_frame, to_pulse_train};
use crate::dshot::protocol::{Command, Packet, THROTTLE_MAX, THROTTLE_MIN};
use crate::error::{DshotError, Result};
use crate::transmitter::{ChannelConfig, PulseTransmitter, Scheduler};

/// Number of all-zero frames in the reset sequence
pub const RESET_FRAME_COUNT: usize = 50;

/// Arming delay in scheduler ticks; minimum throttle is held for this window
pub const ARM_DELAY_TICKS: u64 = 5000;

/// Minimum-throttle hold before a direction change, in scheduler ticks
pub const REVERSAL_HOLD_TICKS: u64 = 200;

/// Direction command repeat count (ESC firmware needs at least 6 to latch;
/// 10 gives margin)
pub const DIRECTION_REPEATS: u32 = 10;

/// DShot protocol controller
///
/// Owns the transmission channel exclusively once [`install`] succeeds. A
/// fresh pulse train is built for every transmission, so no encoded state is
/// ever reused between sends.
///
/// [`install`]: DshotController::install
pub struct DshotController<T: PulseTransmitter, S: Scheduler> {
    transmitter: T,
    scheduler: S,
    /// Channel handle; present from a successful `install` until `uninstall`
    channel: Option<ChannelConfig>,
}

impl<T: PulseTransmitter, S: Scheduler> DshotController<T, S> {
    /// Create a controller over the given capabilities
    ///
    /// The controller is unusable until [`install`] succeeds.
    ///
    /// [`install`]: DshotController::install
    pub fn new(transmitter: T, scheduler: S) -> Self {
        Self {
            transmitter,
            scheduler,
            channel: None,
        }
    }

    /// Configure the transmission channel for DShot output
    ///
    /// Must be called before any other operation.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the transmitter rejects the channel setup;
    /// the controller stays uninstalled.
    pub async fn install(&mut self, pin: u8, channel: u8) -> Result<()> {
        self.install_channel(ChannelConfig::for_dshot(pin, channel))
            .await
    }

    /// Configure the transmission channel from loaded ESC wiring settings
    pub async fn install_from_config(&mut self, esc: &EscConfig) -> Result<()> {
        let mut config = ChannelConfig::for_dshot(esc.pin, esc.channel);
        config.clock_divider = esc.clock_divider;
        self.install_channel(config).await
    }

    async fn install_channel(&mut self, config: ChannelConfig) -> Result<()> {
        self.transmitter.configure(&config).await?;

        info!(pin = config.pin, channel = config.channel, "DShot channel installed");
        self.channel = Some(config);
        Ok(())
    }

    /// Release the transmission channel
    ///
    /// Idempotent: calling it repeatedly, or without a prior `install`, is
    /// safe. Subsequent operations fail with `NotInstalled` until `install`
    /// succeeds again.
    pub async fn uninstall(&mut self) -> Result<()> {
        if self.channel.take().is_some() {
            info!("DShot channel released");
        }
        Ok(())
    }

    /// Perform the ESC bring-up sequence
    ///
    /// Transmits 50 all-zero frames (the reset signal ESCs require to
    /// recognize DShot input), then minimum throttle: once without blocking
    /// when `wait` is false, or repeatedly for the 5000-tick arming delay
    /// when `wait` is true. The repeated variant keeps the ESC armed and
    /// idle for the whole window, sleeping one tick between sends.
    ///
    /// # Errors
    ///
    /// Any transmission failure aborts the sequence immediately; the ESC
    /// must then be considered unarmed and `init` restarted.
    pub async fn init(&mut self, wait: bool) -> Result<()> {
        self.ensure_installed()?;

        debug!("Sending reset sequence");
        for _ in 0..RESET_FRAME_COUNT {
            self.write_frame(0, true).await?;
        }

        debug!("Sending idle throttle");
        let idle = Packet::throttle(THROTTLE_MIN);
        if wait {
            self.repeat_packet_ticks(idle, ARM_DELAY_TICKS).await?;
        } else {
            self.write_packet(idle, false).await?;
        }

        info!("ESC armed");
        Ok(())
    }

    /// Send one throttle packet without blocking
    ///
    /// This is the hot path, expected at a steady control-loop rate: ESCs
    /// treat the signal as lost and disarm when throttle stops arriving for
    /// more than a few milliseconds.
    ///
    /// # Errors
    ///
    /// Returns `InvalidThrottle` for values outside 48..=2047, with no
    /// partial effect.
    pub async fn send_throttle(&mut self, throttle: u16) -> Result<()> {
        if !(THROTTLE_MIN..=THROTTLE_MAX).contains(&throttle) {
            return Err(DshotError::InvalidThrottle(throttle));
        }

        self.write_packet(Packet::throttle(throttle), false).await
    }

    /// Change the motor spin direction
    ///
    /// Three-stage handshake: wait out any in-flight transmission, hold
    /// minimum throttle for 200 ticks, then send the direction command 10
    /// times blocking. Returns once the repeats are transmitted; the ESC's
    /// internal settle time is not waited out here.
    pub async fn set_reversed(&mut self, reversed: bool) -> Result<()> {
        self.ensure_installed()?;

        let direction = if reversed {
            Command::SpinDirectionReversed
        } else {
            Command::SpinDirectionNormal
        };
        debug!(?direction, "Starting direction change handshake");

        self.transmitter.await_idle(1).await?;
        self.repeat_packet_ticks(Packet::throttle(THROTTLE_MIN), REVERSAL_HOLD_TICKS)
            .await?;
        self.repeat_packet(Packet::command(direction), DIRECTION_REPEATS)
            .await?;

        info!(reversed, "Spin direction set");
        Ok(())
    }

    /// Sound the first ESC beep tone
    ///
    /// Blocks through the transmission and the 260-tick window the ESC
    /// needs to finish the tone before accepting another command.
    pub async fn beep(&mut self) -> Result<()> {
        self.send_command(Command::Beep1).await
    }

    /// Issue an ESC command honoring its timing contract
    ///
    /// Transmits the command blocking, repeated per the command's minimum
    /// repeat count with a yield between sends, then sleeps out its
    /// documented post-send delay.
    pub async fn send_command(&mut self, command: Command) -> Result<()> {
        self.ensure_installed()?;

        let contract = command.contract();
        debug!(?command, repeats = contract.min_repeats, "Sending command");

        self.repeat_packet(Packet::command(command), contract.min_repeats)
            .await?;
        if contract.post_delay_ticks > 0 {
            self.scheduler.sleep_ticks(contract.post_delay_ticks).await;
        }

        Ok(())
    }

    fn ensure_installed(&self) -> Result<&ChannelConfig> {
        self.channel.as_ref().ok_or(DshotError::NotInstalled)
    }

    /// Encode and transmit one raw 16-bit frame
    async fn write_frame(&mut self, frame: u16, wait: bool) -> Result<()> {
        self.ensure_installed()?;

        let train = to_pulse_train(frame);
        self.transmitter.transmit(&train, wait).await
    }

    /// Encode and transmit one packet
    async fn write_packet(&mut self, packet: Packet, wait: bool) -> Result<()> {
        self.write_frame(encode_frame(packet.payload, packet.telemetry), wait)
            .await
    }

    /// Transmit a packet `count` times, blocking, yielding between sends
    async fn repeat_packet(&mut self, packet: Packet, count: u32) -> Result<()> {
        for _ in 0..count {
            self.write_packet(packet, true).await?;
            self.scheduler.yield_now().await;
        }
        Ok(())
    }

    /// Re-send a packet without blocking until `ticks` have elapsed
    ///
    /// Waits out any in-flight transmission first, then sends once per tick
    /// until the window closes. Never transmits after the window closes.
    async fn repeat_packet_ticks(&mut self, packet: Packet, ticks: u64) -> Result<()> {
        self.transmitter.await_idle(ticks).await?;

        let stop = self.scheduler.now_ticks() + ticks;
        while self.scheduler.now_ticks() < stop {
            self.write_packet(packet, false).await?;
            self.scheduler.sleep_ticks(1).await;
        }
        Ok(())
    }
}
