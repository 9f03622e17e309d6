use std::{fs::File, io::Read, path::Path};

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::{Error, Node, Result};

const FIELDS: usize = 5;

/// Reads `id,label,location,lat,lon` rows from a headerless CSV file.
pub fn read_nodes(path: &Path) -> Result<Vec<Node>> {
    let file = File::open(path).map_err(|e| {
        Error::invalid_input(format!("failed to open input {}: {e}", path.display()))
    })?;
    let nodes = read_nodes_from_reader(file)?;
    log::info!("input: path={} nodes={}", path.display(), nodes.len());
    Ok(nodes)
}

pub fn read_nodes_from_reader(reader: impl Read) -> Result<Vec<Node>> {
    let mut csv = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut nodes = Vec::new();
    for (idx, record) in csv.records().enumerate() {
        nodes.push(parse_record(idx + 1, &record?)?);
    }

    if nodes.is_empty() {
        return Err(Error::invalid_input("No nodes provided"));
    }
    Ok(nodes)
}

pub fn parse_nodes(input: &str) -> Result<Vec<Node>> {
    read_nodes_from_reader(input.as_bytes())
}

fn parse_record(row: usize, record: &StringRecord) -> Result<Node> {
    if record.len() != FIELDS {
        return Err(Error::invalid_input(format!(
            "Row {row}: expected 'id,label,location,lat,lon' but got {} fields",
            record.len()
        )));
    }

    let id = &record[0];
    if id.is_empty() {
        return Err(Error::invalid_input(format!("Row {row}: missing id")));
    }
    let lat = parse_coord(row, "latitude", &record[3])?;
    let lon = parse_coord(row, "longitude", &record[4])?;

    Ok(Node::new(id, &record[1], &record[2], lat, lon))
}

fn parse_coord(row: usize, field: &str, raw: &str) -> Result<f64> {
    let value: f64 = raw
        .parse()
        .map_err(|_| Error::invalid_input(format!("Row {row}: invalid {field}: {raw}")))?;
    if !value.is_finite() {
        return Err(Error::invalid_input(format!(
            "Row {row}: {field} must be finite: {raw}"
        )));
    }
    Ok(value)
}
