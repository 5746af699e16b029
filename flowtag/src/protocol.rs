use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::diagnostics::Diagnostics;

/// Name returned for protocol numbers missing from the IANA table.
pub const UNKNOWN_PROTOCOL: &str = "unknown";

lazy_static! {
    /// IANA assigned internet protocol numbers, keyed by their decimal string.
    static ref PROTOCOL_NAMES: HashMap<&'static str, &'static str> = [
        ("1", "icmp"),
        ("2", "igmp"),
        ("4", "ipv4"),
        ("6", "tcp"),
        ("17", "udp"),
        ("41", "ipv6"),
        ("47", "gre"),
        ("50", "esp"),
        ("51", "ah"),
        ("58", "ipv6-icmp"),
        ("89", "ospf"),
        ("103", "pim"),
        ("112", "vrrp"),
        ("132", "sctp"),
    ]
    .into_iter()
    .collect();
}

/// Resolves protocol numbers as found in flow records to lowercase names.
pub struct ProtocolResolver<'a> {
    diagnostics: &'a dyn Diagnostics,
}

impl<'a> ProtocolResolver<'a> {
    pub fn new(diagnostics: &'a dyn Diagnostics) -> Self {
        ProtocolResolver { diagnostics }
    }

    /// Returns the canonical name for `protocol_number`, or [`UNKNOWN_PROTOCOL`].
    ///
    /// The input is trimmed but otherwise matched exactly, so `"06"` is not `"6"`.
    /// An unrecognized number is reported as a warning and never fails.
    pub fn resolve(&self, protocol_number: &str) -> &'static str {
        match PROTOCOL_NAMES.get(protocol_number.trim()) {
            Some(name) => *name,
            None => {
                self.diagnostics.warn(&format!(
                    "Protocol number '{}' not recognized.",
                    protocol_number
                ));
                UNKNOWN_PROTOCOL
            }
        }
    }
}
