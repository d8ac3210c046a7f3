use core::fmt;
use std::net::{IpAddr, Ipv4Addr};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

use crate::{Error, Identifier, Result};

/// Identifies one generator instance among the instances of a fleet.
///
/// Always within `0..=1023` so it fits the 10-bit node field of an
/// [`Identifier`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u16);

impl NodeId {
    /// Largest valid node id.
    pub const MAX: u16 = Identifier::NODE_ID_MASK as u16;

    /// Used when no usable host address is found.
    pub const FALLBACK: Self = Self(1);

    /// Validates `value` against the node id range.
    ///
    /// # Errors
    /// Returns [`Error::InvalidNodeId`] if `value` exceeds [`NodeId::MAX`].
    pub fn new(value: u64) -> Result<Self> {
        if value > u64::from(Self::MAX) {
            return Err(Error::InvalidNodeId { value });
        }
        Ok(Self(value as u16))
    }

    /// Hashes the four address bytes with 32-bit FNV-1a and reduces the
    /// result modulo 1024.
    pub const fn from_ipv4(addr: Ipv4Addr) -> Self {
        let hash = fnv1a_32(&addr.octets());
        Self((hash % (Self::MAX as u32 + 1)) as u16)
    }

    /// Derives the node id from the first non-loopback IPv4 address in
    /// `addrs`, falling back to [`NodeId::FALLBACK`].
    pub fn from_addrs<I>(addrs: I) -> Self
    where
        I: IntoIterator<Item = IpAddr>,
    {
        addrs
            .into_iter()
            .find_map(|addr| match addr {
                IpAddr::V4(v4) if !v4.is_loopback() => Some(v4),
                _ => None,
            })
            .map_or(Self::FALLBACK, Self::from_ipv4)
    }

    /// Derives the node id from this host's network interfaces.
    ///
    /// Reads the interface list once. If enumeration fails or only loopback
    /// and IPv6 addresses are present, returns [`NodeId::FALLBACK`].
    pub fn from_host() -> Self {
        match if_addrs::get_if_addrs() {
            Ok(ifaces) => {
                let node = Self::from_addrs(ifaces.iter().map(if_addrs::Interface::ip));
                #[cfg(feature = "tracing")]
                debug!(node_id = node.get(), interfaces = ifaces.len(), "derived node id");
                node
            }
            Err(_e) => {
                #[cfg(feature = "tracing")]
                warn!(error = %_e, "failed to list interfaces, using fallback node id");
                Self::FALLBACK
            }
        }
    }

    pub const fn get(self) -> u16 {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::FALLBACK
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u64> for NodeId {
    type Error = Error;

    fn try_from(value: u64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<NodeId> for u64 {
    fn from(node: NodeId) -> Self {
        u64::from(node.0)
    }
}

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

const fn fnv1a_32(bytes: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}
