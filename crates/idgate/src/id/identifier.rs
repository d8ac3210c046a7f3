use core::fmt;

use serde::{Deserialize, Serialize};

use core::time::Duration;

use crate::{Error, Result, id::layout::write_bit_layout_debug};

/// A 64-bit time-ordered identifier.
///
/// - 1 bit reserved (always zero, so the value is a non-negative `i64`)
/// - 41 bits timestamp (ms since the generator's epoch, by default
///   [`DEFAULT_EPOCH`](crate::DEFAULT_EPOCH))
/// - 10 bits node id
/// - 12 bits sequence
///
/// ```text
///  Bit Index:  63           63 62            22 21             12 11             0
///              +--------------+----------------+-----------------+---------------+
///  Field:      | reserved (1) | timestamp (41) |   node ID (10)  | sequence (12) |
///              +--------------+----------------+-----------------+---------------+
///              |<----------- MSB ---------- 64 bits ----------- LSB ------------>|
/// ```
///
/// Ordering of the packed integer matches `(timestamp, node_id, sequence)`
/// lexicographic ordering.
///
/// # Example
///
/// ```
/// use idgate::Identifier;
///
/// let id = Identifier::from(1000, 2, 1);
/// assert_eq!(id.timestamp(), 1000);
/// assert_eq!(id.node_id(), 2);
/// assert_eq!(id.sequence(), 1);
/// assert_eq!(id.to_i64(), (1000 << 22) | (2 << 12) | 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier {
    id: u64,
}

impl Identifier {
    /// Bitmask for extracting the 41-bit timestamp field. Occupies bits 22
    /// through 62.
    pub const TIMESTAMP_MASK: u64 = (1 << 41) - 1;

    /// Bitmask for extracting the 10-bit node ID field. Occupies bits 12
    /// through 21.
    pub const NODE_ID_MASK: u64 = (1 << 10) - 1;

    /// Bitmask for extracting the 12-bit sequence field. Occupies bits 0
    /// through 11.
    pub const SEQUENCE_MASK: u64 = (1 << 12) - 1;

    /// Number of bits to shift the timestamp to its position.
    pub const TIMESTAMP_SHIFT: u64 = 22;

    /// Number of bits to shift the node ID to its position.
    pub const NODE_ID_SHIFT: u64 = 12;

    /// Number of bits to shift the sequence field.
    pub const SEQUENCE_SHIFT: u64 = 0;

    /// Packs the three fields. Out-of-range inputs are masked to their width.
    pub const fn from(timestamp: u64, node_id: u64, sequence: u64) -> Self {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let node_id = (node_id & Self::NODE_ID_MASK) << Self::NODE_ID_SHIFT;
        let sequence = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self {
            id: timestamp | node_id | sequence,
        }
    }

    /// Packs the three fields, rejecting any that do not fit their width.
    ///
    /// # Errors
    /// - [`Error::TimestampOverflow`] if `timestamp` exceeds 41 bits.
    /// - [`Error::InvalidNodeId`] if `node_id` exceeds 10 bits.
    /// - [`Error::InvalidSequence`] if `sequence` exceeds 12 bits.
    pub const fn try_from_components(timestamp: u64, node_id: u64, sequence: u64) -> Result<Self> {
        if timestamp > Self::TIMESTAMP_MASK {
            return Err(Error::TimestampOverflow { now: timestamp });
        }
        if node_id > Self::NODE_ID_MASK {
            return Err(Error::InvalidNodeId { value: node_id });
        }
        if sequence > Self::SEQUENCE_MASK {
            return Err(Error::InvalidSequence { value: sequence });
        }
        Ok(Self::from(timestamp, node_id, sequence))
    }

    /// Extracts the timestamp (ms since the epoch) from the packed ID.
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the node ID from the packed ID.
    pub const fn node_id(&self) -> u64 {
        (self.id >> Self::NODE_ID_SHIFT) & Self::NODE_ID_MASK
    }

    /// Extracts the sequence number from the packed ID.
    pub const fn sequence(&self) -> u64 {
        (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    pub const fn max_timestamp() -> u64 {
        Self::TIMESTAMP_MASK
    }

    pub const fn max_sequence() -> u64 {
        Self::SEQUENCE_MASK
    }

    /// Returns true if the sequence can be incremented within the current
    /// millisecond.
    pub const fn has_sequence_room(&self) -> bool {
        self.sequence() < Self::SEQUENCE_MASK
    }

    /// Returns a new ID with the sequence incremented.
    pub(crate) const fn increment_sequence(&self) -> Self {
        debug_assert!(self.has_sequence_room());
        Self::from_raw(self.id + 1)
    }

    /// Returns a new ID for a newer timestamp with sequence reset to zero.
    pub(crate) const fn rollover_to_timestamp(&self, ts: u64) -> Self {
        Self::from(ts, self.node_id(), 0)
    }

    /// The packed value.
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// The packed value as a signed integer. Never negative since the top bit
    /// is reserved.
    pub const fn to_i64(&self) -> i64 {
        (self.id & (i64::MAX as u64)) as i64
    }

    /// Returns `None` for negative inputs.
    pub const fn from_i64(raw: i64) -> Option<Self> {
        if raw < 0 {
            None
        } else {
            Some(Self { id: raw as u64 })
        }
    }

    /// Milliseconds since the Unix epoch at which this ID was minted by a
    /// generator whose clock counts from `epoch`.
    ///
    /// ```
    /// use idgate::{DEFAULT_EPOCH, Identifier};
    ///
    /// let id = Identifier::from(5, 0, 0);
    /// assert_eq!(id.unix_millis(DEFAULT_EPOCH), 1_288_834_974_662);
    /// ```
    pub const fn unix_millis(&self, epoch: Duration) -> u64 {
        self.timestamp().saturating_add(epoch.as_millis() as u64)
    }

    /// Returns the ID as a zero-padded 20-digit string.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }
}

impl From<Identifier> for i64 {
    fn from(id: Identifier) -> Self {
        id.to_i64()
    }
}

impl From<Identifier> for u64 {
    fn from(id: Identifier) -> Self {
        id.to_raw()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_bit_layout_debug(f, self, "Identifier")
    }
}
