//! Per-subscription substitution of external route/stop IDs to local ones,
//! applied in place to a copy of the entity before matching. Missing
//! entries are left unchanged.

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct IdMapping {
    pub routes: HashMap<String, String>,
    pub stops: HashMap<String, String>,
}

impl IdMapping {
    pub fn map_route<'a>(&'a self, id: &'a str) -> &'a str {
        self.routes.get(id).map(String::as_str).unwrap_or(id)
    }

    pub fn map_stop<'a>(&'a self, id: &'a str) -> &'a str {
        self.stops.get(id).map(String::as_str).unwrap_or(id)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("malformed id-mapping entry {0:?}: expected exactly one comma-separated \"src\",\"dst\" pair")]
pub struct MappingParseError(String);

/// Parses the subscription config's CSV-pairs mapping syntax: records
/// separated by `;`, each holding two `"`-quoted CSV fields (`src`, `dst`).
///
/// # Example
///
/// ```text
/// "R1-OLD","R1";"R2-OLD","R2"
/// ```
pub fn parse_mapping_pairs(input: &str) -> Result<HashMap<String, String>, MappingParseError> {
    let mut result = HashMap::new();
    for record in input.split(';') {
        let record = record.trim();
        if record.is_empty() {
            continue;
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(record.as_bytes());
        let row = reader
            .records()
            .next()
            .and_then(|r| r.ok())
            .ok_or_else(|| MappingParseError(record.to_owned()))?;
        if row.len() != 2 {
            return Err(MappingParseError(record.to_owned()));
        }
        result.insert(row[0].to_owned(), row[1].to_owned());
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quoted_csv_pairs_separated_by_semicolons() {
        let pairs = parse_mapping_pairs("\"R1-OLD\",\"R1\";\"R2-OLD\",\"R2\"").unwrap();
        assert_eq!(pairs.get("R1-OLD").map(String::as_str), Some("R1"));
        assert_eq!(pairs.get("R2-OLD").map(String::as_str), Some("R2"));
    }

    #[test]
    fn missing_entries_pass_through_unchanged() {
        let mapping = IdMapping {
            routes: [("R1-OLD".to_owned(), "R1".to_owned())].into_iter().collect(),
            stops: HashMap::new(),
        };
        assert_eq!(mapping.map_route("R1-OLD"), "R1");
        assert_eq!(mapping.map_route("UNKNOWN"), "UNKNOWN");
        assert_eq!(mapping.map_stop("S1"), "S1");
    }
}
