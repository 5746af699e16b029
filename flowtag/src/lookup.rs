use std::{collections::HashMap, fs::File, io::Read, path::Path};

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::{
    diagnostics::Diagnostics,
    error::{FlowTagError, Result},
};

/// Tag given to flows whose port/protocol pair has no lookup entry.
pub const UNTAGGED: &str = "Untagged";

/// Maps a destination port to the tags assigned per protocol name.
#[derive(Debug, Default, Clone)]
pub struct LookupTable {
    ports: HashMap<String, HashMap<String, String>>,
}

impl LookupTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `tag` for the pair, returning the tag it replaced, if any.
    pub fn insert(&mut self, port: &str, protocol: &str, tag: &str) -> Option<String> {
        self.ports
            .entry(port.to_string())
            .or_default()
            .insert(protocol.to_string(), tag.to_string())
    }

    /// Exact match on both keys. `protocol` is expected lowercase.
    pub fn get(&self, port: &str, protocol: &str) -> Option<&str> {
        self.ports
            .get(port)
            .and_then(|protocols| protocols.get(protocol))
            .map(String::as_str)
    }

    /// Same as [`LookupTable::get`] but falls back to [`UNTAGGED`].
    pub fn tag_for(&self, port: &str, protocol: &str) -> &str {
        self.get(port, protocol).unwrap_or(UNTAGGED)
    }

    /// Number of distinct destination ports.
    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    /// Number of port/protocol pairs.
    pub fn mapping_count(&self) -> usize {
        self.ports.values().map(HashMap::len).sum()
    }
}

/// Positions of the required columns within a lookup record.
#[derive(Debug, PartialEq)]
struct Columns {
    dstport: usize,
    protocol: usize,
    tag: usize,
}

fn locate_columns(headers: &StringRecord) -> Result<Columns> {
    let (mut dstport, mut protocol, mut tag) = (None, None, None);

    for (index, header) in headers.iter().enumerate() {
        match header.trim().to_lowercase().as_str() {
            "dstport" => dstport = Some(index),
            "protocol" => protocol = Some(index),
            "tag" => tag = Some(index),
            _ => {}
        }
    }

    match (dstport, protocol, tag) {
        (Some(dstport), Some(protocol), Some(tag)) => Ok(Columns {
            dstport,
            protocol,
            tag,
        }),
        _ => {
            let missing: Vec<&str> = [("dstport", dstport), ("protocol", protocol), ("tag", tag)]
                .iter()
                .filter(|(_, index)| index.is_none())
                .map(|(name, _)| *name)
                .collect();
            Err(FlowTagError::LookupHeader(format!(
                "lookup file must contain 'dstport', 'protocol', and 'tag' columns (missing: {})",
                missing.join(", ")
            )))
        }
    }
}

/// Builds a [`LookupTable`] from a comma separated file with a header row.
pub struct LookupLoader<'a> {
    diagnostics: &'a dyn Diagnostics,
    strict: bool,
}

impl<'a> LookupLoader<'a> {
    pub fn new(diagnostics: &'a dyn Diagnostics) -> Self {
        LookupLoader {
            diagnostics,
            strict: false,
        }
    }

    /// In strict mode a repeated port/protocol pair fails the load instead of
    /// overwriting the earlier tag.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn load(&self, path: &Path) -> Result<LookupTable> {
        let file = File::open(path).map_err(|e| FlowTagError::io(path, e))?;
        self.load_from_reader(file)
    }

    /// Loads the table from any reader.
    ///
    /// Rows with an empty port, protocol or tag are skipped. A row with the
    /// wrong number of fields aborts the whole load.
    pub fn load_from_reader<R: Read>(&self, reader: R) -> Result<LookupTable> {
        let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

        let headers = rdr
            .headers()
            .map_err(|e| FlowTagError::LookupHeader(format!("failed to read header: {}", e)))?
            .clone();
        if headers.is_empty() {
            return Err(FlowTagError::LookupHeader(
                "failed to read header: lookup file is empty".to_string(),
            ));
        }
        let columns = locate_columns(&headers)?;

        let mut table = LookupTable::new();
        for result in rdr.records() {
            let record = result?;

            let field = |index: usize| record.get(index).map(str::trim).unwrap_or_default();
            let port = field(columns.dstport);
            let protocol = field(columns.protocol).to_lowercase();
            let tag = field(columns.tag);

            if port.is_empty() || protocol.is_empty() || tag.is_empty() {
                continue;
            }

            if self.strict && table.get(port, &protocol).is_some() {
                return Err(FlowTagError::DuplicateMapping {
                    port: port.to_string(),
                    protocol,
                    line: record.position().map_or(0, |p| p.line()),
                });
            }

            table.insert(port, &protocol, tag);
        }

        self.diagnostics.info(&format!(
            "Loaded {} destination ports ({} port/protocol mappings) from lookup table.",
            table.port_count(),
            table.mapping_count()
        ));

        Ok(table)
    }
}
