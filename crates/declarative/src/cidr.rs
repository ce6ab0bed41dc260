//! IPv4 CIDR arithmetic
//!
//! Implements the same carving rules as the engine's `cidrsubnet` function
//! so literal subnet layouts can be checked at composition time.

use crate::error::{Error, Result};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// An IPv4 network in CIDR notation, normalized to its network address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ipv4Cidr {
    network: u32,
    prefix_len: u8,
}

impl Ipv4Cidr {
    pub fn new(addr: Ipv4Addr, prefix_len: u8) -> Result<Self> {
        if prefix_len > 32 {
            return Err(Error::InvalidCidr(format!("{addr}/{prefix_len}")));
        }
        Ok(Self {
            network: u32::from(addr) & mask(prefix_len),
            prefix_len,
        })
    }

    pub fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.network)
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Carve the `netnum`-th sub-block with `newbits` additional prefix bits
    pub fn subnet(&self, newbits: u8, netnum: u32) -> Result<Self> {
        let out_of_range = || Error::SubnetOutOfRange {
            prefix: self.to_string(),
            newbits,
            netnum,
        };

        let new_prefix = self.prefix_len.checked_add(newbits).ok_or_else(out_of_range)?;
        if new_prefix > 32 || u64::from(netnum) >= (1u64 << newbits) {
            return Err(out_of_range());
        }

        let host_bits = 32 - u32::from(new_prefix);
        let offset = (u64::from(netnum) << host_bits) as u32;
        Ok(Self {
            network: self.network | offset,
            prefix_len: new_prefix,
        })
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        u32::from(addr) & mask(self.prefix_len) == self.network
    }

    /// Whether the two blocks share at least one address
    pub fn overlaps(&self, other: &Self) -> bool {
        let shorter = self.prefix_len.min(other.prefix_len);
        self.network & mask(shorter) == other.network & mask(shorter)
    }
}

fn mask(prefix_len: u8) -> u32 {
    if prefix_len == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix_len))
    }
}

impl FromStr for Ipv4Cidr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidCidr(s.to_string());
        let (addr, prefix) = s.trim().split_once('/').ok_or_else(invalid)?;
        let addr: Ipv4Addr = addr.parse().map_err(|_| invalid())?;
        let prefix: u8 = prefix.parse().map_err(|_| invalid())?;
        Self::new(addr, prefix).map_err(|_| invalid())
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network(), self.prefix_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cidr(s: &str) -> Ipv4Cidr {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(cidr("10.0.0.0/16").to_string(), "10.0.0.0/16");
        // Host bits are dropped like the engine does
        assert_eq!(cidr("10.0.3.7/16").to_string(), "10.0.0.0/16");
        assert_eq!(cidr("0.0.0.0/0").prefix_len(), 0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["10.0.0.0", "10.0.0.0/33", "10.0.0/16", "abc/8", ""] {
            assert!(bad.parse::<Ipv4Cidr>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_subnet_matches_engine() {
        let vpc = cidr("10.0.0.0/16");
        assert_eq!(vpc.subnet(8, 0).unwrap().to_string(), "10.0.0.0/24");
        assert_eq!(vpc.subnet(8, 10).unwrap().to_string(), "10.0.10.0/24");
        assert_eq!(vpc.subnet(8, 22).unwrap().to_string(), "10.0.22.0/24");
        assert_eq!(cidr("172.16.0.0/12").subnet(4, 3).unwrap().to_string(), "172.19.0.0/16");
    }

    #[test]
    fn test_subnet_out_of_range() {
        let vpc = cidr("10.0.0.0/16");
        assert!(matches!(vpc.subnet(8, 256), Err(Error::SubnetOutOfRange { .. })));
        assert!(matches!(cidr("10.0.0.0/28").subnet(8, 0), Err(Error::SubnetOutOfRange { .. })));
    }

    #[test]
    fn test_overlaps_and_contains() {
        let vpc = cidr("10.0.0.0/16");
        let a = vpc.subnet(8, 1).unwrap();
        let b = vpc.subnet(8, 2).unwrap();
        assert!(vpc.overlaps(&a));
        assert!(a.overlaps(&vpc));
        assert!(!a.overlaps(&b));
        assert!(a.contains("10.0.1.200".parse().unwrap()));
        assert!(!a.contains("10.0.2.1".parse().unwrap()));
        assert!(a.contains("10.0.1.255".parse().unwrap()));
    }

    proptest! {
        #[test]
        fn subnets_stay_inside_parent_and_disjoint(
            addr in any::<u32>(),
            prefix in 0u8..=24,
            n in 0u32..256,
            m in 0u32..256,
        ) {
            let parent = Ipv4Cidr::new(Ipv4Addr::from(addr), prefix).unwrap();
            let a = parent.subnet(8, n).unwrap();
            let b = parent.subnet(8, m).unwrap();

            prop_assert_eq!(a.prefix_len(), prefix + 8);
            prop_assert!(parent.contains(a.network()));
            prop_assert!(parent.overlaps(&a));
            prop_assert_eq!(n == m, a.overlaps(&b), "{} vs {}", a, b);
        }
    }
}
