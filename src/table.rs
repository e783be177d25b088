use std::mem::take;

/// One parsed export: the header row's cells plus the data rows beneath it.
#[derive(Debug)]
pub struct RawTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Tab wins if the header line carries one; spreadsheet exports are
/// otherwise comma-delimited.
pub fn sniff_delimiter(text: &str) -> char {
    let header = text.lines().next().unwrap_or("");
    if header.contains('\t') {
        '\t'
    } else {
        ','
    }
}

/// Minimal CSV/TSV parser (quotes + CRLF tolerant). Blank lines are skipped;
/// an unterminated final field is flushed rather than lost.
pub fn parse_rows(text: &str, sep: char) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut field = String::new();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if matches!(chars.peek(), Some('"')) {
                        chars.next(); // double-quote escape
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            c if c == sep && !in_quotes => {
                row.push(take(&mut field));
            }
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                row.push(take(&mut field));
                if !row.is_empty() && !(row.len() == 1 && row[0].is_empty()) {
                    rows.push(take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

/// Decode a raw upload and split it into header + data rows. Lossy UTF-8:
/// a stray Latin-1 byte in one cell must not abort the whole file.
pub fn parse_table(bytes: &[u8]) -> Option<RawTable> {
    let text = String::from_utf8_lossy(bytes);
    let sep = sniff_delimiter(&text);
    let mut rows = parse_rows(&text, sep);
    if rows.is_empty() {
        return None;
    }
    let header = rows.remove(0);
    Some(RawTable { header, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_fields_on_delimiter() {
        let rows = parse_rows("a,b,c\n1,2,3\n", ',');
        assert_eq!(rows, vec![vec!["a", "b", "c"], vec!["1", "2", "3"]]);
    }

    #[test]
    fn quoted_fields_keep_delimiters_and_newlines() {
        let rows = parse_rows("\"a,b\",\"line1\nline2\",\"he said \"\"hi\"\"\"\n", ',');
        assert_eq!(rows, vec![vec!["a,b", "line1\nline2", "he said \"hi\""]]);
    }

    #[test]
    fn crlf_and_blank_lines_are_tolerated() {
        let rows = parse_rows("a,b\r\n\r\n1,2\r\n", ',');
        assert_eq!(rows, vec![vec!["a", "b"], vec!["1", "2"]]);
    }

    #[test]
    fn missing_trailing_newline_flushes_last_row() {
        let rows = parse_rows("a,b\n1,2", ',');
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["1", "2"]);
    }

    #[test]
    fn trailing_newline_adds_no_phantom_row() {
        let rows = parse_rows("a,b\n1,2\n", ',');
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn sniffs_tab_from_header() {
        assert_eq!(sniff_delimiter("a\tb\n1\t2"), '\t');
        assert_eq!(sniff_delimiter("a,b\n1,2"), ',');
    }

    #[test]
    fn table_split_separates_header() {
        let table = parse_table(b"Keyword,Position\nshoes,3\n").unwrap();
        assert_eq!(table.header, vec!["Keyword", "Position"]);
        assert_eq!(table.rows, vec![vec!["shoes", "3"]]);
    }

    #[test]
    fn empty_input_yields_no_table() {
        assert!(parse_table(b"").is_none());
        assert!(parse_table(b"\n\n").is_none());
    }
}
