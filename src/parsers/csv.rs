//! Line tokenizer for comma-delimited exports

/// Field delimiter
pub const DELIMITER: char = ',';

/// Split one line into raw field values.
///
/// A `"` toggles quoted mode and is itself dropped; a delimiter inside
/// quoted mode is literal. Doubled quotes are not an escape: `""` toggles
/// twice and contributes nothing. The final field is always emitted, so an
/// empty line yields a single empty field.
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            DELIMITER if !in_quotes => fields.push(std::mem::take(&mut cell)),
            _ => cell.push(ch),
        }
    }
    fields.push(cell);

    fields
}

/// Trim whitespace, then strip one leading and one trailing quote
pub fn clean_cell(raw: &str) -> &str {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('"').unwrap_or(trimmed);
    trimmed.strip_suffix('"').unwrap_or(trimmed)
}
