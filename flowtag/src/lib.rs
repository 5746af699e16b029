//! Counts AWS VPC flow log (version 2) records per tag and per destination
//! port/protocol pair, using a CSV lookup table to assign the tags.

pub mod aggregate;
pub mod args;
pub mod diagnostics;
pub mod error;
pub mod lookup;
pub mod protocol;
pub mod report;

#[cfg(test)]
mod tests;

pub use aggregate::{AggregateSummary, FlowAggregator, FlowCounts, PortProtocol};
pub use diagnostics::{Diagnostics, LogDiagnostics};
pub use error::{FlowTagError, Result};
pub use lookup::{LookupLoader, LookupTable, UNTAGGED};
pub use protocol::{ProtocolResolver, UNKNOWN_PROTOCOL};
pub use report::{format_report, ReportWriter};
