use std::{borrow::Cow, collections::HashMap, fs::File, io::Read, path::Path};

use csv::{ReaderBuilder, StringRecord};

use crate::{
    diagnostics::Diagnostics,
    error::{FlowTagError, Result},
    lookup::LookupTable,
    protocol::{ProtocolResolver, UNKNOWN_PROTOCOL},
};

/// Number of fields in a version 2 flow log record.
pub const MIN_FIELDS: usize = 14;

// Field indices (0-based) in a version 2 record.
const DSTPORT_INDEX: usize = 6;
const PROTOCOL_INDEX: usize = 7;

/// Key of the port/protocol table: destination port and resolved protocol name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortProtocol {
    pub port: String,
    pub protocol: String,
}

impl PortProtocol {
    pub fn new(port: &str, protocol: &str) -> Self {
        PortProtocol {
            port: port.to_string(),
            protocol: protocol.to_string(),
        }
    }
}

/// The two frequency tables filled by the aggregator.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FlowCounts {
    pub tags: HashMap<String, u64>,
    pub port_protocols: HashMap<PortProtocol, u64>,
}

impl FlowCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one flow in both tables.
    pub fn record(&mut self, port: &str, protocol: &str, tag: &str) {
        *self
            .port_protocols
            .entry(PortProtocol::new(port, protocol))
            .or_insert(0) += 1;
        *self.tags.entry(tag.to_string()).or_insert(0) += 1;
    }

    pub fn tag_count(&self, tag: &str) -> u64 {
        self.tags.get(tag).copied().unwrap_or(0)
    }

    pub fn port_protocol_count(&self, port: &str, protocol: &str) -> u64 {
        self.port_protocols
            .get(&PortProtocol::new(port, protocol))
            .copied()
            .unwrap_or(0)
    }

    /// Number of flows counted. Both tables always agree on it.
    pub fn total(&self) -> u64 {
        self.tags.values().sum()
    }
}

/// Per-run statistics, logged once the log has been consumed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AggregateSummary {
    pub records_read: u64,
    pub records_counted: u64,
    pub malformed: u64,
    pub unreadable: u64,
    pub unknown_protocol: u64,
}

/// Strips the quotes from a field written as `"..."`, with `""` standing for
/// a literal quote. Any other quote in a field makes the record unreadable.
fn unquote_field(field: &str) -> std::result::Result<Cow<'_, str>, &'static str> {
    if !field.contains('"') {
        return Ok(Cow::Borrowed(field));
    }
    if !field.starts_with('"') {
        return Err("bare \" in non-quoted field");
    }
    match field[1..].strip_suffix('"') {
        Some(inner) if !inner.replace("\"\"", "").contains('"') => {
            Ok(Cow::Owned(inner.replace("\"\"", "\"")))
        }
        _ => Err("extraneous or missing \" in quoted field"),
    }
}

/// Reads flow log records and counts them per tag and per port/protocol pair.
pub struct FlowAggregator<'a> {
    lookup: &'a LookupTable,
    resolver: ProtocolResolver<'a>,
    diagnostics: &'a dyn Diagnostics,
}

impl<'a> FlowAggregator<'a> {
    pub fn new(lookup: &'a LookupTable, diagnostics: &'a dyn Diagnostics) -> Self {
        FlowAggregator {
            lookup,
            resolver: ProtocolResolver::new(diagnostics),
            diagnostics,
        }
    }

    pub fn aggregate(&self, path: &Path) -> Result<(FlowCounts, AggregateSummary)> {
        let file = File::open(path).map_err(|e| FlowTagError::io(path, e))?;
        self.consume(file, path)
    }

    pub fn aggregate_reader<R: Read>(&self, reader: R) -> Result<(FlowCounts, AggregateSummary)> {
        self.consume(reader, Path::new("<reader>"))
    }

    fn consume<R: Read>(&self, reader: R, origin: &Path) -> Result<(FlowCounts, AggregateSummary)> {
        // Space separated with a variable number of fields; runs of spaces
        // produce empty fields that are dropped again when tokenizing.
        // Quotes are checked per field by `unquote_field`.
        let mut rdr = ReaderBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(reader);

        let mut counts = FlowCounts::new();
        let mut summary = AggregateSummary::default();
        let mut record = StringRecord::new();
        let mut line_counter: u64 = 0;

        loop {
            match rdr.read_record(&mut record) {
                Ok(false) => break,
                Ok(true) => {
                    line_counter += 1;
                    summary.records_read += 1;
                    let line = record.position().map_or(line_counter, |p| p.line());
                    self.process_record(&record, line, &mut counts, &mut summary);
                }
                Err(e) if e.is_io_error() => return Err(FlowTagError::io(origin, e.into())),
                Err(e) => {
                    line_counter += 1;
                    summary.records_read += 1;
                    summary.unreadable += 1;
                    let line = e.position().map_or(line_counter, |p| p.line());
                    self.diagnostics
                        .warn(&format!("Failed to read line {}: {}", line, e));
                }
            }
        }

        self.diagnostics.info(&format!(
            "Processed {} flow log records: {} counted, {} malformed, {} unreadable, {} with an unknown protocol.",
            summary.records_read,
            summary.records_counted,
            summary.malformed,
            summary.unreadable,
            summary.unknown_protocol
        ));

        Ok((counts, summary))
    }

    fn process_record(
        &self,
        record: &StringRecord,
        line: u64,
        counts: &mut FlowCounts,
        summary: &mut AggregateSummary,
    ) {
        let mut fields = Vec::with_capacity(record.len());
        for field in record.iter() {
            match unquote_field(field) {
                Ok(field) => fields.push(field),
                Err(reason) => {
                    summary.unreadable += 1;
                    self.diagnostics
                        .warn(&format!("Failed to read line {}: {}", line, reason));
                    return;
                }
            }
        }
        let tokens: Vec<&str> = fields.iter().flat_map(|f| f.split_whitespace()).collect();

        if tokens.is_empty() {
            return;
        }

        if tokens.len() < MIN_FIELDS {
            summary.malformed += 1;
            self.diagnostics
                .warn(&format!("Line {} is malformed and will be skipped.", line));
            return;
        }

        let dstport = tokens[DSTPORT_INDEX].trim();
        let protocol_number = tokens[PROTOCOL_INDEX].trim();

        let protocol = self.resolver.resolve(protocol_number);
        if protocol == UNKNOWN_PROTOCOL {
            summary.unknown_protocol += 1;
            self.diagnostics.warn(&format!(
                "Unknown protocol number '{}' on line {}.",
                protocol_number, line
            ));
        }

        let tag = self.lookup.tag_for(dstport, protocol);
        counts.record(dstport, protocol, tag);
        summary.records_counted += 1;
    }
}
