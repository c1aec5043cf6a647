//! Container address selection and CIDR parsing.
//!
//! Each container gets one address from `10.100.42.0/24`, host octet
//! drawn uniformly from `2..=254`. Nothing reserves or tracks addresses
//! across containers, so two concurrent containers may collide.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use rand::Rng;
use unc_common::constants::{
    BRIDGE_CIDR, HOST_OCTET_MAX, HOST_OCTET_MIN, SUBNET_PREFIX, SUBNET_PREFIX_LEN,
};
use unc_common::error::{Result, UncError};

/// An IPv4 address with its prefix length, e.g. `10.100.42.7/24`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cidr {
    /// Interface address.
    pub addr: Ipv4Addr,
    /// Prefix length (0-32).
    pub prefix_len: u8,
}

impl FromStr for Cidr {
    type Err = UncError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |message: String| UncError::Address {
            address: s.to_string(),
            message,
        };
        let (ip_part, prefix_part) = s
            .split_once('/')
            .ok_or_else(|| invalid("missing /prefix".into()))?;
        let addr: Ipv4Addr = ip_part
            .parse()
            .map_err(|e| invalid(format!("invalid IP address '{ip_part}': {e}")))?;
        let prefix_len: u8 = prefix_part
            .parse()
            .map_err(|e| invalid(format!("invalid prefix '{prefix_part}': {e}")))?;
        if prefix_len > 32 {
            return Err(invalid(format!("prefix {prefix_len} exceeds 32")));
        }
        Ok(Self { addr, prefix_len })
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix_len)
    }
}

/// Samples a container address string using `rng`.
pub fn sample_container_cidr<R: Rng + ?Sized>(rng: &mut R) -> String {
    let host = rng.gen_range(HOST_OCTET_MIN..=HOST_OCTET_MAX);
    let [a, b, c] = SUBNET_PREFIX;
    format!("{a}.{b}.{c}.{host}/{SUBNET_PREFIX_LEN}")
}

/// Samples a container address string from the thread-local RNG.
pub fn random_container_cidr() -> String {
    sample_container_cidr(&mut rand::thread_rng())
}

/// The bridge gateway address and prefix.
///
/// # Errors
///
/// Returns an error only if the built-in gateway constant is malformed.
pub fn bridge_gateway() -> Result<Cidr> {
    BRIDGE_CIDR.parse()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn sampled_addresses_stay_inside_the_subnet() {
        let mut rng = rand::thread_rng();
        for _ in 0..10_000 {
            let cidr: Cidr = sample_container_cidr(&mut rng).parse().unwrap();
            let [a, b, c, host] = cidr.addr.octets();
            assert_eq!([a, b, c], [10, 100, 42]);
            assert!((2..=254).contains(&host), "host octet {host} out of range");
            assert_eq!(cidr.prefix_len, 24);
        }
    }

    #[test]
    fn parses_cidr_strings() {
        let cidr: Cidr = "10.100.42.7/24".parse().unwrap();
        assert_eq!(cidr.addr, Ipv4Addr::new(10, 100, 42, 7));
        assert_eq!(cidr.prefix_len, 24);
        assert_eq!(cidr.to_string(), "10.100.42.7/24");
    }

    #[test]
    fn rejects_malformed_cidrs() {
        for bad in ["10.100.42.7", "10.100.42/24", "10.100.42.7/33", "x/24", "10.0.0.1/abc"] {
            let err = bad.parse::<Cidr>().unwrap_err();
            assert!(matches!(err, UncError::Address { .. }), "{bad} should fail");
        }
    }

    #[test]
    fn gateway_is_first_host_of_the_subnet() {
        let gw = bridge_gateway().unwrap();
        assert_eq!(gw.addr, Ipv4Addr::new(10, 100, 42, 1));
        assert_eq!(gw.prefix_len, 24);
    }
}
