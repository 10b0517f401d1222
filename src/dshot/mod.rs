//! # DShot Protocol Module
//!
//! Implementation of the DShot digital ESC protocol.
//!
//! This module handles:
//! - Frame encoding (11-bit payload, telemetry bit, 4-bit checksum)
//! - XOR-fold checksum calculation
//! - Bit-to-pulse-timing mapping (19 ticks per bit, MSB first)
//! - The closed ESC command table with per-command timing contracts

pub mod protocol;
pub mod encoder;
