//! IPv4 address and CIDR notation utilities.
//!
//! Provides [`Ipv4`] for representing an address range with a prefix length,
//! along with the mask arithmetic needed to compare ranges.

use crate::error::Error;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Maximum length for an IPv4 subnet mask (32 bits).
pub const MAX_LENGTH: u8 = 32;

/// Convert a CIDR prefix length to a subnet mask as u32.
///
/// # Examples
/// ```
/// use aro_network_validate::models::cidr_mask;
/// assert_eq!(cidr_mask(24), 0xFFFFFF00);
/// assert_eq!(cidr_mask(0), 0);
/// ```
pub fn cidr_mask(len: u8) -> u32 {
    let len = len.min(MAX_LENGTH);
    u32::MAX.checked_shl(u32::from(MAX_LENGTH - len)).unwrap_or(0)
}

/// Get the network address for a given IP and prefix length.
pub fn cut_addr(addr: Ipv4Addr, len: u8) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(addr) & cidr_mask(len))
}

/// Calculate the broadcast address for a given IP and prefix length.
pub fn broadcast_addr(addr: Ipv4Addr, len: u8) -> Ipv4Addr {
    let mask = cidr_mask(len);
    Ipv4Addr::from((u32::from(addr) & mask) | !mask)
}

/// IPv4 address with CIDR notation support.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Copy, Clone, Hash)]
pub struct Ipv4 {
    /// The IPv4 address as written, host bits included.
    pub addr: Ipv4Addr,
    /// The subnet mask length (0-32).
    pub mask: u8,
}

impl Ipv4 {
    /// Parse a CIDR string (e.g. "10.0.0.0/24").
    ///
    /// Host bits are allowed; the range always covers the whole network.
    pub fn new(addr_cidr: &str) -> Result<Ipv4, Error> {
        let invalid = || Error::InvalidCidr(addr_cidr.to_string());

        let (addr, mask) = addr_cidr.split_once('/').ok_or_else(invalid)?;
        let addr = Ipv4Addr::from_str(addr).map_err(|_| invalid())?;
        if mask.is_empty() || !mask.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let mask: u8 = mask.parse().map_err(|_| invalid())?;
        if mask > MAX_LENGTH {
            return Err(invalid());
        }
        Ok(Ipv4 { addr, mask })
    }

    /// Get the lowest (network) address in the range.
    pub fn lo(&self) -> Ipv4Addr {
        cut_addr(self.addr, self.mask)
    }

    /// Get the highest (broadcast) address in the range.
    pub fn hi(&self) -> Ipv4Addr {
        broadcast_addr(self.addr, self.mask)
    }

    /// True when the two ranges share at least one address.
    pub fn overlaps(&self, other: &Ipv4) -> bool {
        self.lo() <= other.hi() && other.lo() <= self.hi()
    }
}

impl FromStr for Ipv4 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ipv4::new(s)
    }
}

impl std::fmt::Display for Ipv4 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cidr_mask() {
        assert_eq!(cidr_mask(0), 0x00000000);
        assert_eq!(cidr_mask(8), 0xFF000000);
        assert_eq!(cidr_mask(16), 0xFFFF0000);
        assert_eq!(cidr_mask(27), 0xFFFFFFE0);
        assert_eq!(cidr_mask(32), 0xFFFFFFFF);
    }

    #[test]
    fn test_cut_addr() {
        let ip = Ipv4Addr::new(192, 168, 1, 42);
        assert_eq!(cut_addr(ip, 24), Ipv4Addr::new(192, 168, 1, 0));
        assert_eq!(cut_addr(ip, 16), Ipv4Addr::new(192, 168, 0, 0));
        assert_eq!(cut_addr(ip, 32), Ipv4Addr::new(192, 168, 1, 42));
        assert_eq!(cut_addr(ip, 0), Ipv4Addr::new(0, 0, 0, 0));
    }

    #[test]
    fn test_broadcast_addr() {
        let ip = Ipv4Addr::new(192, 168, 1, 0);
        assert_eq!(broadcast_addr(ip, 24), Ipv4Addr::new(192, 168, 1, 255));
        assert_eq!(broadcast_addr(ip, 16), Ipv4Addr::new(192, 168, 255, 255));
        assert_eq!(broadcast_addr(ip, 32), Ipv4Addr::new(192, 168, 1, 0));
    }

    #[test]
    fn test_new_rejects_garbage() {
        for bad in ["not-valid", "10.0.0.0", "10.0.0.0/33", "10.0.0/24", "10.0.0.0/+8", "10.0.0.0/"] {
            let err = Ipv4::new(bad).unwrap_err();
            assert_eq!(err.to_string(), format!("invalid CIDR address: {bad}"));
        }
    }

    #[test]
    fn test_host_bits_keep_network_range() {
        let ip = Ipv4::new("10.0.10.77/24").unwrap();
        assert_eq!(ip.lo(), Ipv4Addr::new(10, 0, 10, 0));
        assert_eq!(ip.hi(), Ipv4Addr::new(10, 0, 10, 255));
        assert_eq!(ip.to_string(), "10.0.10.77/24");
    }

    #[test]
    fn test_overlaps() {
        let master = Ipv4::new("10.0.0.0/24").unwrap();
        let worker = Ipv4::new("10.0.1.0/24").unwrap();
        let vnet = Ipv4::new("10.0.0.0/16").unwrap();
        let inner = Ipv4::new("10.0.0.64/26").unwrap();

        assert!(!master.overlaps(&worker));
        assert!(master.overlaps(&master));
        assert!(vnet.overlaps(&worker));
        assert!(worker.overlaps(&vnet));
        assert!(master.overlaps(&inner));
        assert!(!worker.overlaps(&inner));
    }
}
