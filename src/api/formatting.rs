//! Rendering estimate records as JSON, CSV and plain text

use crate::processing::store::EstimateRecord;

/// JSON renderer for estimate listings
#[derive(Debug, Clone, Copy)]
pub struct JsonFormatter {
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn format(&self, records: &[&EstimateRecord]) -> Result<String, serde_json::Error> {
        if self.pretty {
            serde_json::to_string_pretty(records)
        } else {
            serde_json::to_string(records)
        }
    }
}

/// CSV renderer for estimate listings
#[derive(Debug, Clone, Copy)]
pub struct CsvFormatter {
    pub include_header: bool,
}

impl CsvFormatter {
    pub fn new(include_header: bool) -> Self {
        Self { include_header }
    }

    pub fn header() -> &'static str {
        "sequence,tag_id,x_cm,y_cm,algorithm,anchors_used,session_id,recorded_at_ms"
    }

    pub fn format(&self, records: &[&EstimateRecord]) -> String {
        let mut lines = Vec::with_capacity(records.len() + 1);
        if self.include_header {
            lines.push(Self::header().to_string());
        }
        for record in records {
            lines.push(format!(
                "{},{},{:.2},{:.2},{},{},{},{}",
                record.sequence,
                record.tag_id,
                record.x,
                record.y,
                record.algorithm.as_str(),
                record.anchors_used,
                record.session_id,
                record.recorded_at_ms
            ));
        }
        lines.join("\n")
    }
}

/// Plain-text renderer for estimate listings
#[derive(Debug, Clone, Copy)]
pub struct TextFormatter {
    pub compact: bool,
}

impl TextFormatter {
    pub fn new(compact: bool) -> Self {
        Self { compact }
    }

    pub fn format(&self, records: &[&EstimateRecord]) -> String {
        let lines: Vec<String> = records
            .iter()
            .map(|record| {
                if self.compact {
                    format!(
                        "{}: ({:.2}, {:.2}) {}/{}",
                        record.tag_id,
                        record.x,
                        record.y,
                        record.algorithm.as_str(),
                        record.anchors_used
                    )
                } else {
                    format!(
                        "tag {} at ({:.2}, {:.2}) via {} using {} anchors [seq {}]",
                        record.tag_id,
                        record.x,
                        record.y,
                        record.algorithm.as_str(),
                        record.anchors_used,
                        record.sequence
                    )
                }
            })
            .collect();
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Algorithm;

    fn record(sequence: u64, tag: &str, x: f64, y: f64) -> EstimateRecord {
        EstimateRecord {
            sequence,
            tag_id: tag.to_string(),
            x,
            y,
            algorithm: Algorithm::LeastSquares,
            anchors_used: 4,
            session_id: 1,
            recorded_at_ms: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_json_output_parses_back() {
        let first = record(1, "3", 50.0, 50.0);
        let second = record(2, "3", 56.0, 51.0);
        let output = JsonFormatter::new(false)
            .format(&[&first, &second])
            .unwrap();

        let parsed: Vec<EstimateRecord> = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0], first);
        assert_eq!(parsed[1], second);
    }

    #[test]
    fn test_pretty_json_is_multiline() {
        let first = record(1, "3", 50.0, 50.0);
        let output = JsonFormatter::new(true).format(&[&first]).unwrap();
        assert!(output.contains('\n'));
        assert!(output.contains("\"tag_id\": \"3\""));
    }

    #[test]
    fn test_csv_header_and_rows() {
        let first = record(1, "3", 50.0, 50.0);
        let output = CsvFormatter::new(true).format(&[&first]);

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], CsvFormatter::header());
        assert_eq!(lines[1], "1,3,50.00,50.00,least_squares,4,1,1700000000000");

        let headerless = CsvFormatter::new(false).format(&[&first]);
        assert_eq!(headerless.lines().count(), 1);
    }

    #[test]
    fn test_text_formats() {
        let first = record(7, "3", 50.0, 50.0);

        let compact = TextFormatter::new(true).format(&[&first]);
        assert_eq!(compact, "3: (50.00, 50.00) least_squares/4");

        let full = TextFormatter::new(false).format(&[&first]);
        assert!(full.contains("tag 3"));
        assert!(full.contains("seq 7"));
    }

    #[test]
    fn test_empty_listing_renders_empty() {
        assert_eq!(CsvFormatter::new(false).format(&[]), "");
        assert_eq!(TextFormatter::new(true).format(&[]), "");
    }
}
