use super::LineRecord;

/// Split text into line records, keeping each `\n` with the line it ends.
///
/// Line numbers start at 0. The final record lacks a terminator when the text
/// does not end in a newline; text ending in a newline produces no trailing
/// empty record.
pub fn segment(text: &str) -> Vec<LineRecord> {
    let mut records = Vec::new();
    let mut offset = 0;

    for (line, piece) in text.split_inclusive('\n').enumerate() {
        records.push(LineRecord::new(piece, line, offset));
        offset += piece.len();
    }

    records
}
