//! Tab-separated place records.
//!
//! Columns are positional: id, name, address, phone, longitude, latitude.
//! Longitude comes before latitude in the file.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info};

use crate::models::{GeoPoint, Place};

const ID: usize = 0;
const NAME: usize = 1;
const ADDRESS: usize = 2;
const PHONE: usize = 3;
const LONGITUDE: usize = 4;
const LATITUDE: usize = 5;

/// Parse a places file from disk
pub fn parse_places_file(path: &Path) -> Result<Vec<Place>> {
    info!("Loading places from {}", path.display());

    let file = File::open(path)
        .with_context(|| format!("Failed to open places file {}", path.display()))?;
    let places = parse_places(file)
        .with_context(|| format!("Failed to parse places file {}", path.display()))?;

    info!("Parsed {} places", places.len());
    Ok(places)
}

/// Parse tab-separated rows, skipping the header row.
///
/// Any read error aborts the whole parse. Each data row is converted on its
/// own rayon task; output order is unspecified.
pub fn parse_places<R: Read>(reader: R) -> Result<Vec<Place>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(b'\t')
        .from_reader(reader);

    let records = csv_reader
        .records()
        .collect::<Result<Vec<StringRecord>, csv::Error>>()?;

    let accumulator = Mutex::new(Vec::with_capacity(records.len()));
    let places = &accumulator;

    rayon::scope(|s| {
        for record in &records {
            s.spawn(move |_| {
                let place = place_from_record(record);
                places
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .push(place);
            });
        }
    });

    Ok(accumulator.into_inner().unwrap_or_else(|e| e.into_inner()))
}

/// Map one data row to a place; unparsable coordinates become 0.0.
pub fn place_from_record(record: &StringRecord) -> Place {
    let field = |idx: usize| record.get(idx).unwrap_or_default().to_string();

    Place {
        id: field(ID),
        name: field(NAME),
        address: field(ADDRESS),
        phone: field(PHONE),
        location: GeoPoint {
            lat: parse_coordinate(record, LATITUDE),
            lon: parse_coordinate(record, LONGITUDE),
        },
    }
}

fn parse_coordinate(record: &StringRecord, idx: usize) -> f64 {
    let raw = record.get(idx).unwrap_or_default();
    raw.trim().parse::<f64>().unwrap_or_else(|_| {
        debug!("Bad coordinate {:?} in column {}, using 0", raw, idx);
        0.0
    })
}
