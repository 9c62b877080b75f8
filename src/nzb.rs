//! NZB manifest model.
//!
//! An NZB lists the files of a Usenet post. Each file carries the newsgroups it
//! was posted to and the segments (articles) that make it up:
//!
//! ```xml
//! <nzb xmlns="http://www.newzbin.com/DTD/2003/nzb">
//!   <head>
//!     <meta type="title">Some Release</meta>
//!   </head>
//!   <file poster="poster@example.com" date="1234567890" subject="[1/2] - &quot;release.rar&quot; yEnc (1/2)">
//!     <groups>
//!       <group>alt.binaries.example</group>
//!     </groups>
//!     <segments>
//!       <segment bytes="739811" number="1">part1of2@example.com</segment>
//!       <segment bytes="739811" number="2">part2of2@example.com</segment>
//!     </segments>
//!   </file>
//! </nzb>
//! ```

use std::path::Path;

use crate::error::{Error, Result};
use crate::selection::glob_to_regex;

/// Parsed NZB manifest
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Nzb {
    /// Files in manifest order
    pub files: Vec<NzbFile>,
    /// `<head><meta type="...">` pairs, informational only
    pub meta: Vec<Meta>,
}

/// A `<meta>` entry from the NZB head
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Meta {
    /// The `type` attribute (e.g. "title", "password")
    pub kind: String,
    /// Element text
    pub value: String,
}

/// One logical file of the post
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NzbFile {
    /// Free-text subject line, usually carrying the quoted filename
    pub subject: String,
    /// Poster address
    pub poster: String,
    /// Post timestamp (seconds since the epoch), if present
    pub date: Option<i64>,
    /// Candidate newsgroups, tried in order
    pub groups: Vec<String>,
    /// Segments in manifest order until [`sort_segments`](Self::sort_segments) is called
    pub segments: Vec<Segment>,
}

/// One article of a file
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Segment {
    /// 1-based position within the file
    pub number: u32,
    /// Advertised article size, used for progress only
    pub bytes: u64,
    /// Message-ID without angle brackets
    pub message_id: String,
}

impl Nzb {
    /// Parse NZB XML.
    pub fn parse(content: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(content)
            .map_err(|e| Error::InvalidNzb(format!("NZB content is not valid UTF-8: {}", e)))?;
        let raw: raw::Nzb = quick_xml::de::from_str(text)
            .map_err(|e| Error::InvalidNzb(format!("failed to parse NZB: {}", e)))?;
        Ok(raw.into())
    }

    /// Read an NZB file fully, then parse it.
    pub fn open(path: &Path) -> Result<Self> {
        let content = std::fs::read(path)?;
        Self::parse(&content)
    }

    /// Sum of every file's advertised size.
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(NzbFile::total_size).sum()
    }

    /// First metadata value of the given type.
    pub fn meta(&self, kind: &str) -> Option<&str> {
        self.meta
            .iter()
            .find(|m| m.kind == kind)
            .map(|m| m.value.as_str())
    }

    /// Files whose display name matches `pattern` (or doesn't, with `invert`).
    pub fn glob(&self, pattern: &str, invert: bool) -> Result<Vec<&NzbFile>> {
        let re = glob_to_regex(pattern)?;
        Ok(self
            .files
            .iter()
            .filter(|f| re.is_match(&f.display_name()) != invert)
            .collect())
    }

    /// Move PAR2 files behind everything else, keeping relative order otherwise.
    pub fn par2_last(&mut self) {
        self.files.sort_by_key(NzbFile::is_par2);
    }
}

impl NzbFile {
    /// Filename quoted in the subject, trimmed; empty if there is no quoted span.
    ///
    /// Takes everything between the first and the last `"`, so names that contain
    /// quotes themselves survive.
    pub fn display_name(&self) -> String {
        let Some(first) = self.subject.find('"') else {
            return String::new();
        };
        match self.subject.rfind('"') {
            Some(last) if last > first => self.subject[first + 1..last].trim().to_string(),
            _ => String::new(),
        }
    }

    /// Sum of the advertised segment sizes.
    pub fn total_size(&self) -> u64 {
        self.segments.iter().map(|s| s.bytes).sum()
    }

    /// Order segments by number. Stable, so duplicates keep manifest order.
    pub fn sort_segments(&mut self) {
        self.segments.sort_by_key(|s| s.number);
    }

    /// Whether the display name carries a `.par2` extension.
    pub fn is_par2(&self) -> bool {
        self.display_name().to_ascii_lowercase().ends_with(".par2")
    }
}

/// Serde shapes mirroring the XML; converted into the public model after parsing.
mod raw {
    use serde::Deserialize;

    #[derive(Deserialize)]
    pub(super) struct Nzb {
        #[serde(default)]
        pub(super) head: Option<Head>,
        #[serde(rename = "file", default)]
        pub(super) files: Vec<File>,
    }

    #[derive(Deserialize)]
    pub(super) struct Head {
        #[serde(default)]
        pub(super) meta: Vec<Meta>,
    }

    #[derive(Deserialize)]
    pub(super) struct Meta {
        #[serde(rename = "@type", default)]
        pub(super) kind: String,
        #[serde(rename = "$text", default)]
        pub(super) value: String,
    }

    #[derive(Deserialize)]
    pub(super) struct File {
        #[serde(rename = "@subject", default)]
        pub(super) subject: String,
        #[serde(rename = "@poster", default)]
        pub(super) poster: String,
        #[serde(rename = "@date", default)]
        pub(super) date: Option<i64>,
        #[serde(default)]
        pub(super) groups: Groups,
        #[serde(default)]
        pub(super) segments: Segments,
    }

    #[derive(Deserialize, Default)]
    pub(super) struct Groups {
        #[serde(default)]
        pub(super) group: Vec<String>,
    }

    #[derive(Deserialize, Default)]
    pub(super) struct Segments {
        #[serde(default)]
        pub(super) segment: Vec<Segment>,
    }

    #[derive(Deserialize)]
    pub(super) struct Segment {
        #[serde(rename = "@bytes", default)]
        pub(super) bytes: u64,
        #[serde(rename = "@number")]
        pub(super) number: u32,
        #[serde(rename = "$text")]
        pub(super) message_id: String,
    }
}

impl From<raw::Nzb> for Nzb {
    fn from(raw: raw::Nzb) -> Self {
        Self {
            files: raw.files.into_iter().map(NzbFile::from).collect(),
            meta: raw
                .head
                .map(|h| {
                    h.meta
                        .into_iter()
                        .map(|m| Meta {
                            kind: m.kind,
                            value: m.value.trim().to_string(),
                        })
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

impl From<raw::File> for NzbFile {
    fn from(raw: raw::File) -> Self {
        Self {
            subject: raw.subject,
            poster: raw.poster,
            date: raw.date,
            groups: raw
                .groups
                .group
                .into_iter()
                .map(|g| g.trim().to_string())
                .filter(|g| !g.is_empty())
                .collect(),
            segments: raw
                .segments
                .segment
                .into_iter()
                .map(|s| Segment {
                    number: s.number,
                    bytes: s.bytes,
                    message_id: s
                        .message_id
                        .trim()
                        .trim_start_matches('<')
                        .trim_end_matches('>')
                        .to_string(),
                })
                .collect(),
        }
    }
}
