use std::collections::HashMap;

use crate::predict::{PredictError, Sgp4Propagator};

/// One element set as it appeared in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TleRecord {
    pub name: Option<String>,
    pub line1: String,
    pub line2: String,
}

impl TleRecord {
    /// Catalog designator as written in line 1, e.g. `25544U`.
    pub fn designator(&self) -> Option<&str> {
        self.line1.split_whitespace().nth(1)
    }

    /// Numeric NORAD catalog number with any classification suffix removed.
    pub fn norad_id(&self) -> Option<String> {
        let digits: String = self
            .designator()?
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        if digits.is_empty() {
            None
        } else {
            Some(digits)
        }
    }

    pub fn display_name(&self) -> String {
        match (&self.name, self.norad_id()) {
            (Some(name), _) => name.clone(),
            (None, Some(id)) => format!("NORAD {}", id),
            (None, None) => "Unknown".to_string(),
        }
    }

    pub fn propagator(&self) -> Result<Sgp4Propagator, PredictError> {
        Sgp4Propagator::from_tle(self.name.clone(), &self.line1, &self.line2)
    }

    fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_uppercase();
        if query.is_empty() {
            return false;
        }
        if let Some(designator) = self.designator() {
            if designator.to_uppercase() == query {
                return true;
            }
        }
        if let (Ok(wanted), Some(Ok(have))) = (
            query.parse::<u64>(),
            self.norad_id().map(|id| id.parse::<u64>()),
        ) {
            if wanted == have {
                return true;
            }
        }
        match &self.name {
            Some(name) if !name.trim().is_empty() => {
                let name = name.trim().to_uppercase();
                name.contains(&query) || query.contains(&name)
            }
            _ => false,
        }
    }
}

/// A record picked for one of the caller's requested identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedTle {
    pub query: String,
    pub record: TleRecord,
}

/// Parse multi-satellite TLE content
pub fn parse_multi_tle(content: &str) -> Vec<TleRecord> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut result = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            // 2-line TLE (no name)
            result.push(TleRecord {
                name: None,
                line1: lines[i].to_string(),
                line2: lines[i + 1].to_string(),
            });
            i += 2;
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            // 3-line TLE (with name)
            result.push(TleRecord {
                name: Some(lines[i].trim_start_matches("0 ").to_string()),
                line1: lines[i + 1].to_string(),
                line2: lines[i + 2].to_string(),
            });
            i += 3;
        } else {
            i += 1; // Skip unknown line
        }
    }

    result
}

/// Pick the records matching `queries`, in query order.
///
/// A record matches a query by exact designator, by catalog number, or by a
/// case-insensitive partial name match in either direction. Each record is
/// assigned to the first query it matches; later records win for the same query.
pub fn select(records: &[TleRecord], queries: &[String]) -> Vec<SelectedTle> {
    let mut chosen: HashMap<&str, &TleRecord> = HashMap::new();
    for record in records {
        if let Some(query) = queries.iter().find(|q| record.matches(q)) {
            chosen.insert(query.as_str(), record);
        }
    }

    let mut selected = Vec::new();
    for query in queries {
        if selected.iter().any(|s: &SelectedTle| &s.query == query) {
            continue;
        }
        if let Some(record) = chosen.get(query.as_str()) {
            selected.push(SelectedTle {
                query: query.clone(),
                record: (*record).clone(),
            });
        }
    }
    selected
}
