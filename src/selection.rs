//! File selection by display name.
//!
//! Globs are translated to anchored regular expressions so a single matcher
//! handles `*`, `?`, bracket classes and backslash escapes.

use regex::Regex;

use crate::config::SelectionConfig;
use crate::error::{Error, Result};
use crate::nzb::NzbFile;

/// Compiled selection predicate evaluated against [`NzbFile::display_name`].
#[derive(Clone, Debug)]
pub struct Selection {
    patterns: Vec<Regex>,
    invert: bool,
    par2_only: bool,
}

impl Selection {
    /// Selection that accepts every file.
    pub fn all() -> Self {
        Self {
            patterns: Vec::new(),
            invert: false,
            par2_only: false,
        }
    }

    /// Compile the configured globs.
    pub fn from_config(config: &SelectionConfig) -> Result<Self> {
        let patterns = config
            .patterns
            .iter()
            .map(|p| glob_to_regex(p))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            patterns,
            invert: config.invert,
            par2_only: config.par2_only,
        })
    }

    /// Whether `file` should be downloaded.
    pub fn accepts(&self, file: &NzbFile) -> bool {
        if self.par2_only && !file.is_par2() {
            return false;
        }
        if self.patterns.is_empty() {
            return true;
        }
        let name = file.display_name();
        let matched = self.patterns.iter().any(|re| re.is_match(&name));
        matched != self.invert
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::all()
    }
}

/// Translate a shell-style glob into an anchored regex.
///
/// `*` matches any run of characters, `?` a single character, `[...]` a class
/// (`[!...]` negated) and `\x` the literal `x`.
pub fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push('^');

    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            '\\' => match chars.next() {
                Some(next) => re.push_str(&regex::escape(&next.to_string())),
                None => re.push_str(r"\\"),
            },
            '[' => {
                re.push('[');
                if matches!(chars.peek(), Some('!') | Some('^')) {
                    chars.next();
                    re.push('^');
                }
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        ']' => {
                            closed = true;
                            break;
                        }
                        '\\' | '[' | '&' | '~' => {
                            re.push('\\');
                            re.push(c);
                        }
                        _ => re.push(c),
                    }
                }
                if !closed {
                    return Err(Error::config(
                        "selection.patterns",
                        format!("unterminated character class in pattern '{}'", pattern),
                    ));
                }
                re.push(']');
            }
            _ => re.push_str(&regex::escape(&c.to_string())),
        }
    }
    re.push('$');

    Regex::new(&re).map_err(|e| {
        Error::config(
            "selection.patterns",
            format!("invalid pattern '{}': {}", pattern, e),
        )
    })
}
