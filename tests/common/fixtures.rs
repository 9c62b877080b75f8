//! NZB and yEnc article fixtures

use std::collections::HashMap;

use nzb_slurp::yenc::encode;

/// Encoded line length used by generated articles; short so bodies span many lines
pub const LINE_LEN: usize = 32;

/// A file as it would be posted: original bytes split into yEnc articles
pub struct PostedFile {
    /// Name quoted in the subject and carried in the yEnc header
    pub name: String,
    /// Original content
    pub data: Vec<u8>,
    /// `(number, bytes, message_id)` per segment, in posting order
    pub segments: Vec<(u32, usize, String)>,
    /// Article bodies keyed by message-id (without brackets)
    pub articles: HashMap<String, Vec<u8>>,
    /// Candidate groups written to the NZB
    pub groups: Vec<String>,
}

impl PostedFile {
    /// Post `data` as `name`, split into parts of `part_size` bytes.
    pub fn new(name: &str, data: Vec<u8>, part_size: usize) -> Self {
        let parts = data.len().div_ceil(part_size);
        let mut segments = Vec::new();
        let mut articles = HashMap::new();

        for (index, chunk) in data.chunks(part_size).enumerate() {
            let part = index + 1;
            let begin = index * part_size + 1;
            let mut body = if parts > 1 {
                format!(
                    "=ybegin part={} total={} line={} size={} name={}\r\n=ypart begin={} end={}\r\n",
                    part,
                    parts,
                    LINE_LEN,
                    data.len(),
                    name,
                    begin,
                    begin + chunk.len() - 1
                )
            } else {
                format!("=ybegin line={} size={} name={}\r\n", LINE_LEN, data.len(), name)
            }
            .into_bytes();
            body.extend_from_slice(&encode(chunk, LINE_LEN));
            body.extend_from_slice(format!("=yend size={} part={}\r\n", chunk.len(), part).as_bytes());

            let message_id = format!("{}-{}@fixtures.test", name.replace(' ', "_"), part);
            articles.insert(message_id.clone(), body);
            segments.push((part as u32, chunk.len(), message_id));
        }

        Self {
            name: name.to_string(),
            data,
            segments,
            articles,
            groups: vec!["alt.binaries.test".to_string()],
        }
    }

    /// Override the candidate groups.
    pub fn with_groups(mut self, groups: &[&str]) -> Self {
        self.groups = groups.iter().map(|g| g.to_string()).collect();
        self
    }
}

/// Deterministic content with byte 4 at every multiple of [`LINE_LEN`].
///
/// Byte 4 encodes to `.`, so parts whose size is a multiple of `LINE_LEN` start
/// their first data line with a dot and exercise dot-stuffing.
pub fn sample_data(len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| {
            if i % LINE_LEN == 0 {
                4
            } else {
                (i * 31 % 251) as u8
            }
        })
        .collect()
}

/// Build NZB XML for `files`, listing segments in reverse to exercise sorting.
pub fn nzb_xml(files: &[&PostedFile]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE nzb PUBLIC "-//newzBin//DTD NZB 1.1//EN" "http://www.newzbin.com/DTD/nzb/nzb-1.1.dtd">
<nzb xmlns="http://www.newzbin.com/DTD/2003/nzb">
  <head>
    <meta type="title">Fixture Release</meta>
  </head>
"#,
    );
    for file in files {
        xml.push_str(&format!(
            "  <file poster=\"fixture@example.com\" date=\"1700000000\" subject=\"Fixture [1/1] - &quot;{}&quot; yEnc (1/{})\">\n    <groups>\n",
            file.name,
            file.segments.len()
        ));
        for group in &file.groups {
            xml.push_str(&format!("      <group>{}</group>\n", group));
        }
        xml.push_str("    </groups>\n    <segments>\n");
        for (number, bytes, message_id) in file.segments.iter().rev() {
            xml.push_str(&format!(
                "      <segment bytes=\"{}\" number=\"{}\">{}</segment>\n",
                bytes, number, message_id
            ));
        }
        xml.push_str("    </segments>\n  </file>\n");
    }
    xml.push_str("</nzb>\n");
    xml
}
