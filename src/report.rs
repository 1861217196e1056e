use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Row, Table};

use crate::predict::PassRecord;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const HEADERS: [&str; 6] = [
    "Rise Time (UTC)",
    "Peak Time (UTC)",
    "Set Time (UTC)",
    "Max Elevation (°)",
    "Satellite Name/ID",
    "Eclipse",
];

/// Latest peak first.
pub fn sort_by_peak_desc(passes: &mut [PassRecord]) {
    passes.sort_by(|a, b| b.peak.cmp(&a.peak));
}

pub fn format_table(passes: &[PassRecord]) -> String {
    if passes.is_empty() {
        return "No passes found in the specified time window.".to_string();
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(HEADERS.iter().map(|h| Cell::new(h)).collect::<Vec<_>>());

    for p in passes {
        let eclipse = match p.eclipsed {
            Some(true) => "Yes",
            Some(false) => "No",
            None => "Unknown",
        };
        table.add_row(Row::from(vec![
            Cell::new(p.rise.format(TIME_FORMAT)),
            Cell::new(p.peak.format(TIME_FORMAT)),
            Cell::new(p.set.format(TIME_FORMAT)),
            Cell::new(format!("{:.1}", p.peak_elevation_deg)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{} ({})", p.satellite, p.norad_id)),
            Cell::new(eclipse),
        ]));
    }

    table.to_string()
}

pub fn format_json(passes: &[PassRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(passes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn pass(name: &str, peak_offset_min: i64, eclipsed: Option<bool>) -> PassRecord {
        let rise = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + Duration::minutes(peak_offset_min);
        PassRecord {
            satellite: name.to_string(),
            norad_id: "25544".to_string(),
            rise,
            peak: rise + Duration::minutes(5),
            set: rise + Duration::minutes(10),
            peak_elevation_deg: 47.26,
            eclipsed,
        }
    }

    #[test]
    fn empty_result_message() {
        assert_eq!(format_table(&[]), "No passes found in the specified time window.");
    }

    #[test]
    fn table_contains_formatted_cells() {
        let table = format_table(&[pass("ISS", 0, Some(true)), pass("ISS", 90, None)]);
        assert!(table.contains("Rise Time (UTC)"));
        assert!(table.contains("Max Elevation (°)"));
        assert!(table.contains("│ 2024-01-01 12:00:00 │"));
        assert!(table.contains("│ 2024-01-01 12:05:00 │"));
        assert!(table.contains(" 47.3 │"));
        assert!(table.contains("│ ISS (25544) "));
        assert!(table.contains("│ Yes "));
        assert!(table.contains("│ Unknown "));
        // header, two rows, and four border lines
        assert_eq!(table.lines().count(), 7);
        let widths: Vec<usize> = table.lines().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "ragged table:\n{}", table);
    }

    #[test]
    fn sorts_latest_peak_first() {
        let mut passes = vec![pass("A", 0, None), pass("B", 120, None), pass("C", 60, None)];
        sort_by_peak_desc(&mut passes);
        let names: Vec<_> = passes.iter().map(|p| p.satellite.as_str()).collect();
        assert_eq!(names, ["B", "C", "A"]);
    }

    #[test]
    fn json_serialises_records() {
        let json = format_json(&[pass("ISS", 0, Some(false))]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["satellite"], "ISS");
        assert_eq!(value[0]["eclipsed"], false);
        assert_eq!(value[0]["rise"], "2024-01-01T12:00:00Z");
    }
}
