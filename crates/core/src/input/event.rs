//! Binary layout of `struct input_event`
//!
//! On 64-bit Linux each record is 24 little-endian bytes:
//!
//! ```text
//! offset  size  field
//!      0     8  tv_sec   (i64)
//!      8     8  tv_usec  (i64)
//!     16     2  type     (u16)
//!     18     2  code     (u16)
//!     20     4  value    (i32)
//! ```

/// A fixed-size record a device delivers in one read.
pub trait Record: Sized + Send + 'static {
    /// Exact byte length of one record
    const SIZE: usize;

    /// Decode one record; `bytes` is exactly `SIZE` long.
    fn decode(bytes: &[u8]) -> Option<Self>;
}

/// Event type namespace
pub struct EventType;

impl EventType {
    /// Frame boundary
    pub const SYN: u16 = 0x00;
    /// Key or button press/release/repeat
    pub const KEY: u16 = 0x01;
    /// Relative axis motion
    pub const REL: u16 = 0x02;
    /// Absolute axis position
    pub const ABS: u16 = 0x03;
}

pub const REL_X: u16 = 0x00;
pub const REL_Y: u16 = 0x01;
pub const REL_WHEEL: u16 = 0x08;

pub const BTN_LEFT: u16 = 0x110;
pub const BTN_RIGHT: u16 = 0x111;
pub const BTN_MIDDLE: u16 = 0x112;
pub const BTN_TOUCH: u16 = 0x14A;

pub const ABS_X: u16 = 0x00;
pub const ABS_Y: u16 = 0x01;
pub const ABS_MT_POSITION_X: u16 = 0x35;
pub const ABS_MT_POSITION_Y: u16 = 0x36;

/// Key event values
pub const KEY_RELEASE: i32 = 0;
pub const KEY_PRESS: i32 = 1;
pub const KEY_REPEAT: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub seconds: i64,
    pub microseconds: i64,
    pub kind: u16,
    pub code: u16,
    pub value: i32,
}

impl InputEvent {
    pub const fn new(kind: u16, code: u16, value: i32) -> Self {
        Self {
            seconds: 0,
            microseconds: 0,
            kind,
            code,
            value,
        }
    }

    pub fn key(code: u16, value: i32) -> Self {
        Self::new(EventType::KEY, code, value)
    }

    pub fn rel(code: u16, value: i32) -> Self {
        Self::new(EventType::REL, code, value)
    }

    pub fn abs(code: u16, value: i32) -> Self {
        Self::new(EventType::ABS, code, value)
    }

    pub fn syn() -> Self {
        Self::new(EventType::SYN, 0, 0)
    }

    /// Serialize in kernel layout, e.g. to feed a reader from a pipe.
    pub fn encode(&self) -> [u8; 24] {
        let mut out = [0u8; 24];
        out[0..8].copy_from_slice(&self.seconds.to_le_bytes());
        out[8..16].copy_from_slice(&self.microseconds.to_le_bytes());
        out[16..18].copy_from_slice(&self.kind.to_le_bytes());
        out[18..20].copy_from_slice(&self.code.to_le_bytes());
        out[20..24].copy_from_slice(&self.value.to_le_bytes());
        out
    }
}

impl Record for InputEvent {
    const SIZE: usize = 24;

    fn decode(bytes: &[u8]) -> Option<Self> {
        let bytes: &[u8; 24] = bytes.try_into().ok()?;
        let i64_at = |at: usize| {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&bytes[at..at + 8]);
            i64::from_le_bytes(raw)
        };
        Some(Self {
            seconds: i64_at(0),
            microseconds: i64_at(8),
            kind: u16::from_le_bytes([bytes[16], bytes[17]]),
            code: u16::from_le_bytes([bytes[18], bytes[19]]),
            value: i32::from_le_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]),
        })
    }
}
