//! # DShot Link Library
//!
//! Generate and transmit DShot digital motor-control signals to electronic
//! speed controllers (ESCs).
//!
//! This library provides the pure DShot packet encoder (frame layout,
//! checksum, per-bit pulse timings) and a protocol controller that sequences
//! the higher-level behaviors ESCs require: the reset sequence, the arming
//! delay, repeated direction-change commands and beeps. The pulse emission
//! hardware and the tick scheduler are injected capabilities, so the
//! protocol logic runs and tests without a physical transmitter.

pub mod config;
pub mod error;
pub mod dshot;
pub mod transmitter;
pub mod controller;
