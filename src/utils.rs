use crate::models::ListingRecord;
use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};

pub const CSV_HEADER: [&str; 6] = [
    "FechaDescarga",
    "Barrio",
    "Valor",
    "NumHabitaciones",
    "NumBanos",
    "mts2",
];

/// Render records under the fixed header. Fields containing commas, quotes or
/// newlines are quoted. Card records are one cell wider than the header, so
/// the writer runs in flexible mode. Lines are separated by `\n`; there is
/// no newline after the last one.
pub fn records_to_csv(records: &[ListingRecord]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.write_record(record.to_csv_record())?;
    }
    writer.flush()?;

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to finish CSV output: {}", e.error()))?;
    let mut csv = String::from_utf8(bytes).context("CSV output is not valid UTF-8")?;
    if csv.ends_with('\n') {
        csv.pop();
    }
    Ok(csv)
}

pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Processed artifacts are keyed by the day they were produced: `{date}.csv`.
pub fn artifact_key(processing_date: NaiveDate) -> String {
    format!("{}.csv", processing_date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldValue;

    fn record(neighborhood: &str, title: Option<&str>) -> ListingRecord {
        ListingRecord {
            capture_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            title: title.map(FieldValue::text),
            neighborhood: FieldValue::text(neighborhood),
            price: FieldValue::text("700000"),
            bedrooms: FieldValue::Integer(1),
            bathrooms: FieldValue::Unresolved,
            area: FieldValue::Integer(30),
        }
    }

    #[test]
    fn header_then_one_line_per_record() {
        let csv = records_to_csv(&[record("Suba", None), record("Bosa", None)]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "FechaDescarga,Barrio,Valor,NumHabitaciones,NumBanos,mts2");
        assert_eq!(lines[1], "2025-03-01,Suba,700000,1,N/A,30");
    }

    #[test]
    fn quotes_embedded_commas() {
        let csv = records_to_csv(&[record("Chapinero, Bogotá", Some("Apto \"lindo\""))]).unwrap();
        let line = csv.lines().nth(1).unwrap();
        assert_eq!(
            line,
            r#"2025-03-01,"Apto ""lindo""","Chapinero, Bogotá",700000,1,N/A,30"#
        );

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(csv.as_bytes());
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(row.len(), 7);
        assert_eq!(&row[2], "Chapinero, Bogotá");
    }

    #[test]
    fn empty_input_is_header_only() {
        let csv = records_to_csv(&[]).unwrap();
        assert_eq!(csv, "FechaDescarga,Barrio,Valor,NumHabitaciones,NumBanos,mts2");
    }

    #[test]
    fn no_newline_after_last_row() {
        let csv = records_to_csv(&[record("Suba", None)]).unwrap();
        assert_eq!(
            csv,
            "FechaDescarga,Barrio,Valor,NumHabitaciones,NumBanos,mts2\n2025-03-01,Suba,700000,1,N/A,30"
        );
    }

    #[test]
    fn artifact_key_uses_processing_date() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert_eq!(artifact_key(date), "2025-12-31.csv");
    }
}
