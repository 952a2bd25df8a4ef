//! Line-oriented input helpers for the menus

use crate::Result;
use std::io::{BufRead, Write};

/// Line that ends multi-line text entry
pub const END_SENTINEL: &str = "END";

const RULE: &str = "--------------------------------------------------";

/// Read one line without its trailing newline; `None` at end of input
pub fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }

    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(Some(line))
}

/// Print a boxed prompt and read the answer, trimmed
pub fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, prompt: &str) -> Result<Option<String>> {
    writeln!(out)?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "{}", prompt)?;
    writeln!(out, "{}", RULE)?;
    write!(out, "> ")?;
    out.flush()?;

    Ok(read_line(input)?.map(|line| line.trim().to_string()))
}

/// Read lines until one whose trimmed content is `END` (or end of input)
pub fn read_until_sentinel<R: BufRead>(input: &mut R) -> Result<String> {
    let mut lines = Vec::new();
    while let Some(line) = read_line(input)? {
        if line.trim() == END_SENTINEL {
            break;
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

/// Wait for the user to acknowledge a message
pub fn pause<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<()> {
    write!(out, "Press Enter to continue...")?;
    out.flush()?;
    read_line(input)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_line_strips_newlines() {
        let mut input = Cursor::new("first\r\nsecond\n");
        assert_eq!(read_line(&mut input).unwrap().as_deref(), Some("first"));
        assert_eq!(read_line(&mut input).unwrap().as_deref(), Some("second"));
        assert_eq!(read_line(&mut input).unwrap(), None);
    }

    #[test]
    fn test_read_until_sentinel() {
        let mut input = Cursor::new("line one\n  indented\n END \nafter\n");
        assert_eq!(read_until_sentinel(&mut input).unwrap(), "line one\n  indented");
        assert_eq!(read_line(&mut input).unwrap().as_deref(), Some("after"));
    }

    #[test]
    fn test_read_until_sentinel_at_eof() {
        let mut input = Cursor::new("no terminator");
        assert_eq!(read_until_sentinel(&mut input).unwrap(), "no terminator");
    }

    #[test]
    fn test_ask_trims_answer() {
        let mut input = Cursor::new("  42 \n");
        let mut out = Vec::new();
        let answer = ask(&mut input, &mut out, "Pick a number").unwrap();
        assert_eq!(answer.as_deref(), Some("42"));
        assert!(String::from_utf8(out).unwrap().contains("Pick a number"));
    }
}
