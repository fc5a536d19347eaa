use core::{fmt, time::Duration};

/// A 64-bit Snowflake-style ID with a zeroed low range.
///
/// - 40 bits timestamp (ms since [`TINYFLAKE_EPOCH`])
/// - 8 bits worker ID
/// - 6 bits sequence
/// - 10 bits reserved, always zero
///
/// ```text
///  Bit Index:  63             24 23             16 15            10 9              0
///              +----------------+-----------------+---------------+----------------+
///  Field:      | timestamp (40) | worker ID (8)   | sequence (6)  | reserved (10)  |
///              +----------------+-----------------+---------------+----------------+
///              |<--------------- MSB ---------- 64 bits --------- LSB ------------>|
/// ```
///
/// The reserved field keeps every ID an exact multiple of 1024, so it
/// survives a round trip through clients whose integers are backed by `f64`
/// without losing the worker or sequence bits.
///
/// The timestamp field holds 2^40 ms (about 34.8 years). After about 17.4
/// years the top bit is set and [`Self::to_i64`] turns negative; after the
/// full range the field wraps. Neither case is handled.
///
/// [`TINYFLAKE_EPOCH`]: crate::TINYFLAKE_EPOCH
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TinyflakeId {
    id: u64,
}

impl TinyflakeId {
    /// Bitmask for extracting the 40-bit timestamp field. Occupies bits 24
    /// through 63.
    pub const TIMESTAMP_MASK: u64 = (1 << 40) - 1;

    /// Bitmask for extracting the 8-bit worker ID field. Occupies bits 16
    /// through 23.
    pub const WORKER_ID_MASK: u64 = (1 << 8) - 1;

    /// Bitmask for extracting the 6-bit sequence field. Occupies bits 10
    /// through 15.
    pub const SEQUENCE_MASK: u64 = (1 << 6) - 1;

    /// Bitmask covering the 10 reserved low bits.
    pub const RESERVED_MASK: u64 = (1 << 10) - 1;

    /// Number of bits to shift the timestamp to its correct position (bit 24).
    pub const TIMESTAMP_SHIFT: u64 = 24;

    /// Number of bits to shift the worker ID to its correct position (bit 16).
    pub const WORKER_ID_SHIFT: u64 = 16;

    /// Number of bits to shift the sequence to its correct position (bit 10).
    pub const SEQUENCE_SHIFT: u64 = 10;

    /// Packs the three fields, truncating each to its width. The reserved
    /// bits are left zero.
    pub const fn from(timestamp: u64, worker_id: u64, sequence: u64) -> Self {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let worker_id = (worker_id & Self::WORKER_ID_MASK) << Self::WORKER_ID_SHIFT;
        let sequence = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self {
            id: timestamp | worker_id | sequence,
        }
    }

    /// Extracts the timestamp from the packed ID.
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the worker ID from the packed ID.
    pub const fn worker_id(&self) -> u64 {
        (self.id >> Self::WORKER_ID_SHIFT) & Self::WORKER_ID_MASK
    }

    /// Extracts the sequence number from the packed ID.
    pub const fn sequence(&self) -> u64 {
        (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    /// Extracts the reserved low bits. Zero for every ID built with
    /// [`Self::from`].
    pub const fn reserved(&self) -> u64 {
        self.id & Self::RESERVED_MASK
    }

    pub const fn max_timestamp() -> u64 {
        Self::TIMESTAMP_MASK
    }

    pub const fn max_worker_id() -> u64 {
        Self::WORKER_ID_MASK
    }

    pub const fn max_sequence() -> u64 {
        Self::SEQUENCE_MASK
    }

    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Reinterprets the raw bits as a signed host integer.
    ///
    /// This is the value handed to embedding hosts whose integers are signed
    /// 64-bit. It is negative once the top timestamp bit is set.
    pub const fn to_i64(&self) -> i64 {
        self.id as i64
    }

    /// Returns the timestamp as milliseconds since the Unix epoch, given the
    /// epoch the ID was generated against.
    pub const fn unix_millis(&self, epoch: Duration) -> u64 {
        self.timestamp() + epoch.as_millis() as u64
    }

    /// Returns the ID as a zero-padded 20-digit string.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }
}

impl From<TinyflakeId> for u64 {
    fn from(id: TinyflakeId) -> Self {
        id.to_raw()
    }
}

impl fmt::Display for TinyflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for TinyflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TinyflakeId")
            .field("raw", &format_args!("0x{:016x}", self.id))
            .field("timestamp", &self.timestamp())
            .field("worker_id", &self.worker_id())
            .field("sequence", &self.sequence())
            .field("reserved", &self.reserved())
            .finish()
    }
}
