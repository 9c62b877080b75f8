//! yEnc codec.
//!
//! yEnc encodes each byte as `(b + 42) mod 256`, escaping the handful of results
//! that cannot travel in an article (NUL, LF, CR and `=`) as `=` followed by the
//! byte re-biased by 64. Metadata travels on control lines starting with `=y`:
//!
//! ```text
//! =ybegin part=1 line=128 size=123456 name=some file.bin
//! =ypart begin=1 end=640000
//! ...encoded data...
//! =yend size=640000 part=1 pcrc32=abcdef12
//! ```
//!
//! - [`assemble`] - rebuilds an output file from its scratch segments

pub mod assemble;

use std::collections::HashMap;

use crate::error::{Error, Result};

pub use assemble::{AssembleReport, assemble, scratch_path};

/// Key/value pairs of a control line; the keyword (`ybegin`, `ypart`, `yend`) is under `type`.
pub type ControlLine = HashMap<String, String>;

const ESCAPE: u8 = b'=';

/// Decode one line of yEnc data.
///
/// CR and LF are dropped, so callers can pass lines with or without terminators.
pub fn decode(line: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(line.len());
    decode_into(line, &mut out);
    out
}

/// Decode one line of yEnc data, appending to `out`.
pub fn decode_into(line: &[u8], out: &mut Vec<u8>) {
    let mut escaped = false;
    for &byte in line {
        if byte == b'\r' || byte == b'\n' {
            continue;
        }
        if byte == ESCAPE && !escaped {
            escaped = true;
            continue;
        }
        let mut c = byte;
        if escaped {
            escaped = false;
            c = c.wrapping_sub(64);
        }
        out.push(if c <= 41 {
            c.wrapping_add(214)
        } else {
            c.wrapping_sub(42)
        });
    }
}

/// Encode `data` as yEnc lines of at most `line_len` encoded bytes, each ending in CRLF.
///
/// An escape pair is never split across lines, so a line may run one byte over.
pub fn encode(data: &[u8], line_len: usize) -> Vec<u8> {
    let line_len = line_len.max(1);
    let mut out = Vec::with_capacity(data.len() + data.len() / 32 + 2);
    let mut column = 0;
    for &byte in data {
        let c = byte.wrapping_add(42);
        if matches!(c, 0x00 | b'\n' | b'\r' | ESCAPE) {
            out.push(ESCAPE);
            out.push(c.wrapping_add(64));
            column += 2;
        } else {
            out.push(c);
            column += 1;
        }
        if column >= line_len {
            out.extend_from_slice(b"\r\n");
            column = 0;
        }
    }
    if column > 0 {
        out.extend_from_slice(b"\r\n");
    }
    out
}

/// Whether `line` carries encoded data rather than a `=y` control keyword.
pub fn is_data_line(line: &[u8]) -> bool {
    line.len() < 2 || line[0] != b'=' || line[1] != b'y'
}

/// Whether `line` is a `=ybegin`/`=ypart`/`=yend` control line.
pub fn is_control_line(line: &[u8]) -> bool {
    !is_data_line(line)
}

/// Parse a control line into its key/value pairs.
///
/// The `name` value may contain unquoted spaces, so pairs are peeled off from the
/// right: the text after the last `=` is a value and the word before it is its key.
/// When the last `=` is the leading one, what remains is the keyword.
pub fn parse_control_line(text: &str) -> Result<ControlLine> {
    let mut words = ControlLine::new();
    let mut rest = text.trim_end_matches(['\r', '\n']);

    loop {
        let Some(eq) = rest.rfind('=') else {
            return Err(Error::ControlLine(format!("no keyword in '{}'", text)));
        };
        if eq == 0 {
            let keyword = rest[1..].trim_end();
            if !keyword.starts_with('y') {
                return Err(Error::ControlLine(format!(
                    "keyword '{}' is not a yEnc keyword",
                    keyword
                )));
            }
            words.insert("type".to_string(), keyword.to_string());
            break;
        }

        let value = &rest[eq + 1..];
        let head = &rest[..eq];
        let Some(space) = head.rfind(' ') else {
            return Err(Error::ControlLine(format!(
                "missing separator before key in '{}'",
                text
            )));
        };
        words
            .entry(head[space + 1..].to_string())
            .or_insert_with(|| value.to_string());
        rest = &head[..space];
    }

    if words.len() < 2 {
        return Err(Error::ControlLine(format!("no key/value pairs in '{}'", text)));
    }
    Ok(words)
}
