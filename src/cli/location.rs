//! Location parsing for CLI commands

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Result, bail};

/// `file:line[:column]`, 1-indexed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLocation {
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
}

impl ParsedLocation {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            bail!("Location cannot be empty");
        }

        // numeric suffixes are taken from the right so drive letters survive
        let mut parts = input.rsplitn(3, ':');
        let last = parts.next().unwrap_or_default();
        let middle = parts.next();
        let head = parts.next();

        if is_negative(last) || middle.is_some_and(is_negative) {
            bail!("Invalid position in '{input}': negative values not allowed, positions are 1-indexed");
        }

        let (file, line, column) = match (head, middle) {
            (Some(file), Some(line)) if is_number(line) && is_number(last) => {
                (file.to_string(), line, Some(last))
            }
            (Some(drive), Some(path)) if is_number(last) => (format!("{drive}:{path}"), last, None),
            (None, Some(file)) if is_number(last) => (file.to_string(), last, None),
            _ => bail!("Invalid location '{input}'. Expected: file:line[:column]\nExample: src/Foo.cs:10:5"),
        };

        let line = parse_position("line", line)?;
        let column = column.map(|c| parse_position("column", c)).transpose()?.unwrap_or(1);

        if file.is_empty() {
            bail!("Location '{input}' has no file");
        }

        Ok(Self {
            file: PathBuf::from(file),
            line,
            column,
        })
    }
}

fn is_number(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}

fn is_negative(part: &str) -> bool {
    part.strip_prefix('-').is_some_and(is_number)
}

fn parse_position(what: &str, value: &str) -> Result<u32> {
    let parsed: u32 = value
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid {what} number '{value}'"))?;
    if parsed == 0 {
        bail!("{what} must be >= 1 (got 0); positions are 1-indexed");
    }
    Ok(parsed)
}

impl FromStr for ParsedLocation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ParsedLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_location() {
        let loc = ParsedLocation::parse("src/Foo.cs:10:5").unwrap();
        assert_eq!(loc.file, PathBuf::from("src/Foo.cs"));
        assert_eq!(loc.line, 10);
        assert_eq!(loc.column, 5);
    }

    #[test]
    fn test_parse_without_column() {
        let loc = ParsedLocation::parse("src/Foo.cs:10").unwrap();
        assert_eq!(loc.file, PathBuf::from("src/Foo.cs"));
        assert_eq!(loc.line, 10);
        assert_eq!(loc.column, 1);
    }

    #[test]
    fn test_parse_windows_path() {
        let loc = ParsedLocation::parse("C:\\src\\Foo.cs:10:5").unwrap();
        assert_eq!(loc.file, PathBuf::from("C:\\src\\Foo.cs"));
        assert_eq!((loc.line, loc.column), (10, 5));

        let loc = ParsedLocation::parse("C:\\src\\Foo.cs:7").unwrap();
        assert_eq!(loc.file, PathBuf::from("C:\\src\\Foo.cs"));
        assert_eq!((loc.line, loc.column), (7, 1));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(ParsedLocation::parse("").is_err());
        assert!(ParsedLocation::parse("Foo.cs").is_err());
        assert!(ParsedLocation::parse("Foo.cs:0:1").is_err());
        assert!(ParsedLocation::parse("Foo.cs:3:0").is_err());
        assert!(ParsedLocation::parse(":3").is_err());
    }

    #[test]
    fn test_parse_negative() {
        let err = ParsedLocation::parse("Foo.cs:-5:1").unwrap_err();
        assert!(err.to_string().contains("negative"));
    }

    #[test]
    fn test_display_round_trip() {
        let loc: ParsedLocation = "src/Foo.cs:10".parse().unwrap();
        assert_eq!(loc.to_string(), "src/Foo.cs:10:1");
    }
}
