//! IPv4 helpers for the appliance network settings

use anyhow::{anyhow, Result};
use std::net::Ipv4Addr;

/// Prefix length of a netmask, rejecting masks whose bits are not
/// left-packed and contiguous.
pub fn netmask_prefix(mask: Ipv4Addr) -> Result<u8> {
    let bits: u32 = mask.into();
    let len = bits.count_ones();
    if bits.leading_ones() != len {
        return Err(anyhow!("bits not contiguous in {mask}"));
    }
    Ok(len as u8)
}

/// Netmask for a prefix length, `None` past /32
pub fn prefix_to_netmask(prefix: u8) -> Option<Ipv4Addr> {
    match prefix {
        0 => Some(Ipv4Addr::UNSPECIFIED),
        1..=32 => Some(Ipv4Addr::from(u32::MAX << (32 - u32::from(prefix)))),
        _ => None,
    }
}

/// First host address of the network `ip` belongs to
pub fn compute_gateway(ip: Ipv4Addr, mask: Ipv4Addr) -> Ipv4Addr {
    let network = u32::from(ip) & u32::from(mask);
    Ipv4Addr::from(network.wrapping_add(1))
}

/// Prefix length of the first `inet a.b.c.d/nn` in `ip -o -4 addr` output
pub fn parse_inet_prefix(output: &str) -> Option<u8> {
    let mut words = output.split_whitespace();
    while let Some(w) = words.next() {
        if w == "inet" {
            let cidr = words.next()?;
            let (_, prefix) = cidr.split_once('/')?;
            return prefix.parse().ok();
        }
    }
    None
}
