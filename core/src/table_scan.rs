//! Locates the pipe-delimited table block inside a model response.
//!
//! Grammar: a table is a maximal run of adjacent lines, each of which
//! (ignoring surrounding whitespace) matches `| cell (| cell)+ |`.
//! Only the first such run is returned.
//!
//! The scan is an explicit state machine:
//!   Scanning ─ table line ─▶ InTable ─ other line / EOF ─▶ Done

/// Byte span of the table block in the original text, plus its lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableBlock<'a> {
    /// Start offset of the first table line.
    pub start: usize,
    /// End offset (exclusive) of the last table line, line terminator included.
    pub end: usize,
    /// Block lines with terminators and surrounding whitespace stripped.
    pub lines: Vec<&'a str>,
}

impl<'a> TableBlock<'a> {
    /// The exact substring of the source text covered by the block.
    pub fn as_str<'s>(&self, source: &'s str) -> &'s str {
        &source[self.start..self.end]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Scanning,
    InTable { start: usize },
    Done { start: usize },
}

/// True when `line` starts and ends with `|` and has at least one interior `|`.
pub fn is_table_line(line: &str) -> bool {
    let line = line.trim();
    if line.len() < 3 || !line.starts_with('|') || !line.ends_with('|') {
        return false;
    }
    line[1..line.len() - 1].contains('|')
}

/// Find the first table block in `text`, if any.
pub fn find_table_block(text: &str) -> Option<TableBlock<'_>> {
    let mut state = ScanState::Scanning;
    let mut lines = Vec::new();
    let mut end = 0usize;
    let mut offset = 0usize;

    for raw in text.split_inclusive('\n') {
        if matches!(state, ScanState::Done { .. }) {
            break;
        }
        let line_start = offset;
        offset += raw.len();
        let content = raw.trim_end_matches(['\n', '\r']);

        state = match state {
            ScanState::Scanning if is_table_line(content) => {
                lines.push(content.trim());
                end = offset;
                ScanState::InTable { start: line_start }
            }
            ScanState::Scanning => ScanState::Scanning,
            ScanState::InTable { start } if is_table_line(content) => {
                lines.push(content.trim());
                end = offset;
                ScanState::InTable { start }
            }
            ScanState::InTable { start } => ScanState::Done { start },
            done @ ScanState::Done { .. } => done,
        };
    }

    match state {
        ScanState::InTable { start } | ScanState::Done { start } => {
            Some(TableBlock { start, end, lines })
        }
        ScanState::Scanning => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_line_needs_interior_delimiter() {
        assert!(is_table_line("| a | b |"));
        assert!(is_table_line("  |a|b|  "));
        assert!(!is_table_line("| a |"));
        assert!(!is_table_line("||"));
        assert!(!is_table_line("a | b | c"));
        assert!(!is_table_line("| a | b"));
    }

    #[test]
    fn first_run_only() {
        let text = "intro\n| a | b |\n| 1 | 2 |\n\nmiddle\n| c | d |\n";
        let block = find_table_block(text).unwrap();
        assert_eq!(block.lines, vec!["| a | b |", "| 1 | 2 |"]);
        assert_eq!(block.as_str(text), "| a | b |\n| 1 | 2 |\n");
    }

    #[test]
    fn block_at_end_without_newline() {
        let text = "x\n| a | b |";
        let block = find_table_block(text).unwrap();
        assert_eq!(block.as_str(text), "| a | b |");
    }

    #[test]
    fn no_block() {
        assert!(find_table_block("just prose\n- a bullet\n").is_none());
        assert!(find_table_block("").is_none());
    }
}
