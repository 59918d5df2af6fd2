use std::collections::HashMap;
use std::fs;
use std::path::Path;

use sgp4::{Constants, Elements};

use crate::predict::error::PredictError;

/// Lookup of orbital elements by exact satellite name
pub trait ElementsSource {
    type Elements;

    fn lookup(&self, satellite: &str) -> Option<&Self::Elements>;
}

impl<E> ElementsSource for HashMap<String, E> {
    type Elements = E;

    fn lookup(&self, satellite: &str) -> Option<&E> {
        self.get(satellite)
    }
}

pub struct TleEntry {
    pub name: String,
    pub norad_id: u64,
    pub elements: Elements,
    pub constants: Constants,
}

impl TleEntry {
    pub fn from_lines(name: Option<String>, line1: &str, line2: &str) -> Result<Self, String> {
        let elements = Elements::from_tle(name.clone(), line1.as_bytes(), line2.as_bytes())
            .map_err(|e| e.to_string())?;
        let constants = Constants::from_elements(&elements).map_err(|e| e.to_string())?;
        let norad_id = elements.norad_id;

        Ok(Self {
            name: name.unwrap_or_else(|| format!("NORAD {}", norad_id)),
            norad_id,
            elements,
            constants,
        })
    }
}

/// Satellites read from a single TLE file
pub struct TleLoader {
    source: String,
    satellites: HashMap<String, TleEntry>,
}

impl TleLoader {
    pub fn from_file(path: &Path) -> Result<Self, PredictError> {
        let content = fs::read_to_string(path)?;
        Self::from_content(&path.display().to_string(), &content)
    }

    /// Parse TLE content. Sets rejected by the SGP4 parser are skipped;
    /// content with TLE-looking lines but no usable set is an error.
    pub fn from_content(source: &str, content: &str) -> Result<Self, PredictError> {
        let sets = parse_multi_tle(content);
        let mut satellites = HashMap::new();
        let mut last_error = None;

        for (name, line1, line2) in sets {
            match TleEntry::from_lines(name, &line1, &line2) {
                Ok(entry) => {
                    if satellites.contains_key(&entry.name) {
                        log::warn!("{}: duplicate entry for {}, keeping the last", source, entry.name);
                    }
                    satellites.insert(entry.name.clone(), entry);
                }
                Err(e) => {
                    log::warn!("Skipping invalid TLE in {}: {}", source, e);
                    last_error = Some(e);
                }
            }
        }

        if satellites.is_empty() {
            if let Some(message) = last_error {
                return Err(PredictError::InvalidTle {
                    file: source.to_string(),
                    message,
                });
            }
        }

        log::info!("Loaded {} satellites from {}", satellites.len(), source);
        Ok(Self {
            source: source.to_string(),
            satellites,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Names of all loaded satellites, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.satellites.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl ElementsSource for TleLoader {
    type Elements = TleEntry;

    fn lookup(&self, satellite: &str) -> Option<&TleEntry> {
        self.satellites.get(satellite)
    }
}

/// Split content into (name, line1, line2) sets, accepting 2-line and
/// 3-line forms.
fn parse_multi_tle(content: &str) -> Vec<(Option<String>, String, String)> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut result = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            result.push((None, lines[i].to_string(), lines[i + 1].to_string()));
            i += 2;
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            // Celestrak style "0 NAME" title lines
            let name = lines[i].strip_prefix("0 ").unwrap_or(lines[i]).trim();
            result.push((
                Some(name.to_string()),
                lines[i + 1].to_string(),
                lines[i + 2].to_string(),
            ));
            i += 3;
        } else {
            i += 1;
        }
    }

    result
}
