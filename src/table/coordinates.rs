use serde::Serialize;
use std::collections::HashMap;

/// Station position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Planar (Euclidean) distance in degree space
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let d_lat = self.latitude - other.latitude;
        let d_lon = self.longitude - other.longitude;
        (d_lat.powi(2) + d_lon.powi(2)).sqrt()
    }
}

/// Station identifier -> coordinate lookup
///
/// Stations keep their insertion order; the first coordinate seen for a
/// station wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinateTable {
    stations: Vec<String>,
    coordinates: HashMap<String, Coordinate>,
}

impl CoordinateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a station unless it is already present. Returns whether it was added.
    pub fn insert(&mut self, station: impl Into<String>, coordinate: Coordinate) -> bool {
        let station = station.into();
        if self.coordinates.contains_key(&station) {
            return false;
        }
        self.coordinates.insert(station.clone(), coordinate);
        self.stations.push(station);
        true
    }

    pub fn contains(&self, station: &str) -> bool {
        self.coordinates.contains_key(station)
    }

    pub fn get(&self, station: &str) -> Option<Coordinate> {
        self.coordinates.get(station).copied()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn stations(&self) -> &[String] {
        &self.stations
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Coordinate)> + '_ {
        self.stations.iter().filter_map(|station| {
            self.coordinates
                .get(station)
                .map(|coordinate| (station.as_str(), *coordinate))
        })
    }

    /// Distance between two known stations
    pub fn distance(&self, a: &str, b: &str) -> Option<f64> {
        Some(self.get(a)?.distance_to(&self.get(b)?))
    }
}

impl FromIterator<(String, Coordinate)> for CoordinateTable {
    fn from_iter<I: IntoIterator<Item = (String, Coordinate)>>(iter: I) -> Self {
        let mut table = CoordinateTable::new();
        for (station, coordinate) in iter {
            table.insert(station, coordinate);
        }
        table
    }
}
