use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use csv::{Terminator, WriterBuilder};
use log::debug;

use crate::{
    aggregate::{FlowCounts, PortProtocol},
    error::{FlowTagError, Result},
};

const TAG_SECTION_HEADER: &str = "Tag Counts:\n\nTag,Count\n";
const PORT_PROTOCOL_SECTION_HEADER: &str =
    "\nPort/Protocol Combination Counts:\n\nPort,Protocol,Count\n";

/// Sort order of the port/protocol rows.
///
/// Ports that parse as integers are ordered by value, then protocol name.
/// Other keys compare lexicographically as `port,protocol`: those starting
/// below `'0'` (such as the `-` of NODATA records) sort ahead of every
/// numeric port, the rest after them.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum PortOrder<'a> {
    Before(String),
    Numeric(i64, &'a str, &'a str),
    After(String),
}

impl<'a> PortOrder<'a> {
    fn of(key: &'a PortProtocol) -> Self {
        if let Ok(port) = key.port.parse::<i64>() {
            return PortOrder::Numeric(port, &key.protocol, &key.port);
        }
        let composite = format!("{},{}", key.port, key.protocol);
        if composite.as_bytes()[0] < b'0' {
            PortOrder::Before(composite)
        } else {
            PortOrder::After(composite)
        }
    }
}

/// Writes `rows` as CSV records, quoting fields only where needed.
fn csv_rows<I, R>(rows: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for row in rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| FlowTagError::Csv(e.into_error().into()))
}

/// Renders both count tables as the textual report.
///
/// Tags are sorted by byte order and port/protocol rows by [`PortOrder`],
/// so identical counts always render to identical bytes.
pub fn format_report(counts: &FlowCounts) -> Result<String> {
    let mut tags: Vec<(&String, &u64)> = counts.tags.iter().collect();
    tags.sort_by(|a, b| a.0.cmp(b.0));

    let mut port_protocols: Vec<(&PortProtocol, &u64)> = counts.port_protocols.iter().collect();
    port_protocols.sort_by_cached_key(|&(key, _)| PortOrder::of(key));

    let mut report = Vec::new();
    report.extend_from_slice(TAG_SECTION_HEADER.as_bytes());
    report.extend(csv_rows(
        tags.into_iter()
            .map(|(tag, count)| [tag.clone(), count.to_string()]),
    )?);
    report.extend_from_slice(PORT_PROTOCOL_SECTION_HEADER.as_bytes());
    report.extend(csv_rows(port_protocols.into_iter().map(|(key, count)| {
        [key.port.clone(), key.protocol.clone(), count.to_string()]
    }))?);

    Ok(String::from_utf8_lossy(&report).into_owned())
}

/// Buffered writer for the report file.
pub struct ReportWriter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl ReportWriter {
    /// Creates (or truncates) the output file.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| FlowTagError::io(path, e))?;
        Ok(ReportWriter {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    pub fn write_report(&mut self, counts: &FlowCounts) -> Result<()> {
        debug!("Writing report to {}", self.path.display());
        let report = format_report(counts)?;
        self.writer
            .write_all(report.as_bytes())
            .map_err(|e| FlowTagError::io(&self.path, e))
    }

    /// Flushes the buffered report; the file is closed when the writer drops.
    pub fn flush_and_close(mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| FlowTagError::io(&self.path, e))
    }
}
