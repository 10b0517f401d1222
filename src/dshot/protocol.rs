//! # DShot Protocol Constants and Types
//!
//! Core protocol definitions for DShot ESC communication.
//!
//! Timing is expressed in protocol ticks: the transmitter clock divider is
//! chosen so that 19 ticks make up exactly one DShot bit period.

/// Protocol ticks per DShot bit period
pub const TICKS_PER_BIT: u16 = 19;

/// High time of a "1" bit in ticks
pub const T1H: u16 = 14;

/// Low time of a "1" bit in ticks
pub const T1L: u16 = TICKS_PER_BIT - T1H;

/// High time of a "0" bit in ticks
pub const T0H: u16 = 7;

/// Low time of a "0" bit in ticks
pub const T0L: u16 = TICKS_PER_BIT - T0H;

/// Inter-frame pause in ticks (200 bit periods of silence)
pub const FRAME_PAUSE_TICKS: u16 = TICKS_PER_BIT * 200;

/// Transmitter clock divider yielding the 19-tick bit period
pub const CLOCK_DIVIDER: u8 = 7;

/// Number of bits in a DShot frame
pub const FRAME_BITS: usize = 16;

/// Pulse train length: 16 frame bits plus the trailing pause symbol
pub const PULSE_TRAIN_LEN: usize = 17;

/// Payload value range (11-bit: 0-2047)
pub const PAYLOAD_MASK: u16 = 0x07FF;

/// Minimum throttle value (values below 48 are reserved command codes)
pub const THROTTLE_MIN: u16 = 48;

/// Maximum throttle value
pub const THROTTLE_MAX: u16 = 2047;

/// One bit's physical encoding: two timed sub-intervals
///
/// Frame bits always start high and return low; the trailing pause symbol
/// is all low with a zero-length second half, terminating the transmission
/// buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PulseSymbol {
    /// Duration of the first sub-interval in protocol ticks
    pub duration0: u16,

    /// Level of the first sub-interval (true = high)
    pub level0: bool,

    /// Duration of the second sub-interval in protocol ticks
    pub duration1: u16,

    /// Level of the second sub-interval (true = high)
    pub level1: bool,
}

impl PulseSymbol {
    /// Symbol for a "1" frame bit: 14 ticks high, 5 ticks low
    pub const ONE: PulseSymbol = PulseSymbol {
        duration0: T1H,
        level0: true,
        duration1: T1L,
        level1: false,
    };

    /// Symbol for a "0" frame bit: 7 ticks high, 12 ticks low
    pub const ZERO: PulseSymbol = PulseSymbol {
        duration0: T0H,
        level0: true,
        duration1: T0L,
        level1: false,
    };

    /// Trailing inter-frame pause: 200 bit periods of silence
    pub const PAUSE: PulseSymbol = PulseSymbol {
        duration0: FRAME_PAUSE_TICKS,
        level0: false,
        duration1: 0,
        level1: false,
    };
}

/// Pulse train type (16 bit symbols followed by the pause symbol)
pub type PulseTrain = [PulseSymbol; PULSE_TRAIN_LEN];

/// A DShot packet before frame encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet {
    /// 11-bit payload: throttle 48-2047 or a command code 0-47
    pub payload: u16,

    /// Telemetry request bit
    pub telemetry: bool,
}

impl Packet {
    /// Packet carrying a throttle magnitude, telemetry not requested
    pub fn throttle(value: u16) -> Self {
        Self {
            payload: value,
            telemetry: false,
        }
    }

    /// Packet carrying an ESC command code
    ///
    /// Command packets set the telemetry bit, matching what ESC firmware
    /// expects for special commands.
    pub fn command(command: Command) -> Self {
        Self {
            payload: command.value(),
            telemetry: true,
        }
    }
}

/// ESC command codes (payload values 0-47)
///
/// From the BLHeli_32 digital command specification. Each command carries a
/// documented minimum repeat count and post-send wait, exposed through
/// [`Command::contract`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Command {
    MotorStop = 0,
    Beep1 = 1,
    Beep2 = 2,
    Beep3 = 3,
    Beep4 = 4,
    Beep5 = 5,
    EscInfo = 6,
    SpinDirection1 = 7,
    SpinDirection2 = 8,
    Mode3dOff = 9,
    Mode3dOn = 10,
    SettingsRequest = 11,
    SaveSettings = 12,
    SpinDirectionNormal = 20,
    SpinDirectionReversed = 21,
    Led0On = 22,
    Led1On = 23,
    Led2On = 24,
    Led3On = 25,
    Led0Off = 26,
    Led1Off = 27,
    Led2Off = 28,
    Led3Off = 29,
}

/// Timing contract of one ESC command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandContract {
    /// Number of consecutive transmissions the ESC needs to latch the command
    pub min_repeats: u32,

    /// Minimum wait after the last transmission before the next command,
    /// in scheduler ticks (one tick = one millisecond)
    pub post_delay_ticks: u64,
}

impl Command {
    /// Raw 11-bit payload value of this command
    pub fn value(self) -> u16 {
        self as u16
    }

    /// Documented repeat/wait requirement for this command
    pub fn contract(self) -> CommandContract {
        let (min_repeats, post_delay_ticks) = match self {
            Command::Beep1 | Command::Beep2 => (1, 260),
            Command::Beep3 | Command::Beep4 => (1, 280),
            Command::Beep5 => (1, 1020),
            Command::EscInfo => (1, 12),
            Command::SpinDirection1
            | Command::SpinDirection2
            | Command::Mode3dOff
            | Command::Mode3dOn
            | Command::SpinDirectionNormal
            | Command::SpinDirectionReversed => (6, 0),
            Command::SaveSettings => (6, 35),
            _ => (1, 0),
        };

        CommandContract {
            min_repeats,
            post_delay_ticks,
        }
    }
}
