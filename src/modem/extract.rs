//! Downstream table extraction from the Arris status page.
//!
//! The page carries a heading mentioning "Downstream" followed by a table
//! with one row per channel:
//!
//! ```text
//! | Downstream 1 | DCID | 549.00 MHz | 3.80 dBmV | 41.24 dB | 256QAM | octets | correcteds | uncorrectables |
//! ```
//!
//! A single bad row aborts the whole extraction. Partial polls are never
//! published.

use scraper::{ElementRef, Html};
use tracing::debug;

use crate::error::ParseError;
use crate::modem::sample::{DownstreamChannelSample, PollResult, CENTI_SCALE};

const MARKER: &str = "Downstream";

const COL_FREQUENCY: usize = 2;
const COL_POWER: usize = 3;
const COL_SIGNAL_TO_NOISE: usize = 4;
const COL_OCTETS: usize = 6;
const COL_CORRECTED: usize = 7;
const COL_UNCORRECTED: usize = 8;

/// Extracts all downstream channel rows, failing on the first bad row.
pub fn extract_downstream(raw: &[u8]) -> Result<PollResult, ParseError> {
    let html = std::str::from_utf8(raw).map_err(|e| ParseError::Encoding(e.to_string()))?;
    let document = Html::parse_document(html);

    let mut samples = Vec::new();
    for table in downstream_tables(&document) {
        for row in channel_rows(table) {
            let sample = parse_row(samples.len(), row)?;
            samples.push(sample);
        }
    }

    debug!("Extracted {} downstream channels", samples.len());
    Ok(samples)
}

/// Concatenated text of the element's direct text children.
fn own_text(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|node| node.value().as_text().map(|text| &**text))
        .collect()
}

/// First table following each "Downstream" heading, in document order.
fn downstream_tables(document: &Html) -> Vec<ElementRef<'_>> {
    let mut tables: Vec<ElementRef<'_>> = Vec::new();

    let headings = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| own_text(*element).contains(MARKER));

    for heading in headings {
        let table = heading
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|sibling| sibling.value().name() == "table");

        if let Some(table) = table {
            if !tables.iter().any(|seen| seen.id() == table.id()) {
                tables.push(table);
            }
        }
    }

    tables
}

/// Rows whose first `td` mentions "Downstream".
fn channel_rows(table: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    table
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name() == "tr")
        .filter(|row| {
            row.children()
                .filter_map(ElementRef::wrap)
                .find(|cell| cell.value().name() == "td")
                .is_some_and(|cell| own_text(cell).contains(MARKER))
        })
}

fn parse_row(row_index: usize, row: ElementRef<'_>) -> Result<DownstreamChannelSample, ParseError> {
    let cells: Vec<ElementRef<'_>> = row.children().filter_map(ElementRef::wrap).collect();

    let text = |column: usize| -> Result<String, ParseError> {
        let cell = cells.get(column).ok_or(ParseError::MissingCell {
            row: row_index,
            column,
        })?;
        let text = own_text(*cell).trim().to_string();
        if text.is_empty() {
            return Err(ParseError::MissingText {
                row: row_index,
                column,
            });
        }
        Ok(text)
    };

    Ok(DownstreamChannelSample {
        frequency: parse_centi(row_index, COL_FREQUENCY, &text(COL_FREQUENCY)?)?,
        power: parse_centi(row_index, COL_POWER, &text(COL_POWER)?)?,
        signal_to_noise: parse_centi(row_index, COL_SIGNAL_TO_NOISE, &text(COL_SIGNAL_TO_NOISE)?)?,
        octets: parse_counter(row_index, COL_OCTETS, &text(COL_OCTETS)?)?,
        corrected_errors: parse_counter(row_index, COL_CORRECTED, &text(COL_CORRECTED)?)?,
        uncorrected_errors: parse_counter(row_index, COL_UNCORRECTED, &text(COL_UNCORRECTED)?)?,
    })
}

/// Parses "549.00 MHz" style text into centi-units.
fn parse_centi(row: usize, column: usize, text: &str) -> Result<f64, ParseError> {
    let invalid = || ParseError::InvalidNumber {
        row,
        column,
        text: text.to_string(),
    };

    // Any Unicode whitespace ends the number, NBSP included.
    let number = text.split_whitespace().next().ok_or_else(invalid)?;
    let value: f64 = number.parse().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }

    // Round away binary noise below 1/1000 of a centi-unit (3.8 * 100 = 379.99999999999994).
    Ok((value * CENTI_SCALE * 1000.0).round() / 1000.0)
}

fn parse_counter(row: usize, column: usize, text: &str) -> Result<i64, ParseError> {
    text.parse().map_err(|_| ParseError::InvalidNumber {
        row,
        column,
        text: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(rows: &str) -> String {
        format!(
            "<html><body>\
             <h4> Downstream </h4>\
             <table>\
             <tr><td></td><td>DCID</td><td>Freq</td><td>Power</td><td>SNR</td>\
             <td>Modulation</td><td>Octets</td><td>Correcteds</td><td>Uncorrectables</td></tr>\
             {rows}\
             </table>\
             <h4> Upstream </h4>\
             <table>\
             <tr><td>Upstream 1</td><td>5</td><td>30.60 MHz</td><td>41.75 dBmV</td></tr>\
             </table>\
             </body></html>"
        )
    }

    fn row(label: &str, freq: &str, power: &str, snr: &str, octets: &str) -> String {
        format!(
            "<tr><td>{label}</td><td>1</td><td>{freq}</td><td>{power}</td><td>{snr}</td>\
             <td>256QAM</td><td>{octets}</td><td>2</td><td>0</td></tr>"
        )
    }

    #[test]
    fn test_extracts_single_row() {
        let html = page(&row("Downstream 1", "549.0 MHz", "3.8 dBmV", "41.2 dB", "1000"));
        let samples = extract_downstream(html.as_bytes()).unwrap();

        assert_eq!(
            samples,
            vec![DownstreamChannelSample {
                frequency: 54900.0,
                power: 380.0,
                signal_to_noise: 4120.0,
                octets: 1000,
                corrected_errors: 2,
                uncorrected_errors: 0,
            }]
        );
    }

    #[test]
    fn test_header_and_upstream_rows_are_skipped() {
        let rows = [
            row("Downstream 1", "549.00 MHz", "3.80 dBmV", "41.24 dB", "10"),
            row("Downstream 2", "555.00 MHz", "-1.25 dBmV", "40.95 dB", "20"),
        ]
        .concat();
        let samples = extract_downstream(page(&rows).as_bytes()).unwrap();

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].frequency, 55500.0);
        assert_eq!(samples[1].power, -125.0);
        assert_eq!(samples[1].octets, 20);
    }

    #[test]
    fn test_non_numeric_frequency_discards_everything() {
        let rows = [
            row("Downstream 1", "549.00 MHz", "3.80 dBmV", "41.24 dB", "10"),
            row("Downstream 2", "---- MHz", "3.80 dBmV", "41.24 dB", "10"),
        ]
        .concat();
        let err = extract_downstream(page(&rows).as_bytes()).unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidNumber {
                row: 1,
                column: COL_FREQUENCY,
                text: "---- MHz".into()
            }
        );
    }

    #[test]
    fn test_negative_counter_is_kept() {
        let rows = [
            row("Downstream 1", "549.00 MHz", "3.80 dBmV", "41.24 dB", "10"),
            "<tr><td>Downstream 2</td><td>2</td><td>555.00 MHz</td><td>3.50 dBmV</td>\
             <td>40.95 dB</td><td>256QAM</td><td>-2147483000</td><td>4</td><td>-3</td></tr>"
                .to_string(),
        ]
        .concat();
        let samples = extract_downstream(page(&rows).as_bytes()).unwrap();

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].octets, -2147483000);
        assert_eq!(samples[1].uncorrected_errors, -3);
        assert_eq!(samples[0].uncorrected_errors, 0);
    }

    #[test]
    fn test_any_whitespace_separates_the_unit() {
        let html = page(&row("Downstream 1", "549.00\u{a0}MHz", "3.80\tdBmV", "41.24 dB", "10"));
        let samples = extract_downstream(html.as_bytes()).unwrap();

        assert_eq!(samples[0].frequency, 54900.0);
        assert_eq!(samples[0].power, 380.0);
    }

    #[test]
    fn test_counter_with_unit_is_rejected() {
        let html = page(&row("Downstream 1", "549 MHz", "3.8 dBmV", "41.2 dB", "1000 bytes"));
        let err = extract_downstream(html.as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { column: COL_OCTETS, .. }));
    }

    #[test]
    fn test_short_row_is_missing_cell() {
        let rows = "<tr><td>Downstream 1</td><td>1</td><td>549 MHz</td><td>3.8 dBmV</td></tr>";
        let err = extract_downstream(page(rows).as_bytes()).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingCell {
                row: 0,
                column: COL_SIGNAL_TO_NOISE
            }
        );
    }

    #[test]
    fn test_nested_markup_cell_has_no_text() {
        let rows = "<tr><td>Downstream 1</td><td>1</td><td><b>549 MHz</b></td><td>3.8 dBmV</td>\
                    <td>41 dB</td><td>x</td><td>1</td><td>2</td><td>3</td></tr>";
        let err = extract_downstream(page(rows).as_bytes()).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingText {
                row: 0,
                column: COL_FREQUENCY
            }
        );
    }

    #[test]
    fn test_no_heading_yields_no_rows() {
        let html = "<html><body><table><tr><td>Downstream 1</td></tr></table></body></html>";
        assert!(extract_downstream(html.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_encoding_error() {
        let err = extract_downstream(&[0x3c, 0xff, 0xfe, 0x3e]).unwrap_err();
        assert!(matches!(err, ParseError::Encoding(_)));
    }

    #[test]
    fn test_unclosed_markup_is_tolerated() {
        let html = "<h4>Downstream</h4><table><tr><td>Downstream 1<td>1<td>549 MHz<td>3.8 dBmV\
                    <td>41.2 dB<td>256QAM<td>7<td>8<td>9";
        let samples = extract_downstream(html.as_bytes()).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].uncorrected_errors, 9);
    }
}
