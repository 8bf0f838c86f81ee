//! Reading the list of URLs to audit.

use std::path::Path;

use anyhow::{Context, Result};

/// Read a newline-delimited URL list.
pub fn read_urls(path: &Path) -> Result<Vec<String>> {
  let content = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read URL list: {}", path.display()))?;
  Ok(parse_urls(&content))
}

/// One URL per line. Blank lines and `#` comments are skipped; nothing is
/// validated.
pub fn parse_urls(content: &str) -> Vec<String> {
  content
    .lines()
    .map(str::trim)
    .filter(|line| !line.is_empty() && !line.starts_with('#'))
    .map(str::to_string)
    .collect()
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;

  #[test]
  fn test_parse_urls_skips_blanks_and_comments() {
    let content = "https://a.test\r\n\n   \n# staging\nhttps://b.test/path  \n";
    assert_eq!(parse_urls(content), vec!["https://a.test", "https://b.test/path"]);
  }

  #[test]
  fn test_parse_urls_keeps_order_and_duplicates() {
    let content = "https://b.test\nhttps://a.test\nhttps://b.test";
    assert_eq!(
      parse_urls(content),
      vec!["https://b.test", "https://a.test", "https://b.test"]
    );
  }

  #[test]
  fn test_read_urls_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_urls(&dir.path().join("urls.txt")).unwrap_err();
    assert!(err.to_string().contains("failed to read URL list"));
  }

  #[test]
  fn test_read_urls() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "https://a.test").unwrap();
    writeln!(file, "not-even-a-url").unwrap();
    assert_eq!(
      read_urls(file.path()).unwrap(),
      vec!["https://a.test", "not-even-a-url"]
    );
  }
}
