//! Output reconstruction from scratch segments.
//!
//! Each scratch file holds the raw body of one article. Segments are walked in
//! order and their decoded data lines appended to a single output file whose
//! name comes from the first `=ybegin` header seen.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::nzb::Segment;
use crate::utils::{output_file_name, scratch_file_name};

use super::{decode_into, is_control_line, parse_control_line};

/// Outcome of rebuilding one file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssembleReport {
    /// Output file, if any segment carried a usable header
    pub output: Option<PathBuf>,
    /// Decoded bytes appended to the output
    pub bytes_written: u64,
    /// Segments whose scratch file was absent (fetch failed)
    pub segments_missing: usize,
    /// The header-named output existed before decoding began; nothing was written
    pub already_exists: bool,
}

/// Location of a segment's scratch file inside `dir`.
pub fn scratch_path(dir: &Path, message_id: &str) -> PathBuf {
    dir.join(scratch_file_name(message_id))
}

/// Decode `segments` (already sorted) from their scratch files in `dir` into one output file.
///
/// For every segment, control lines are consumed until one without a `part` key has
/// been read; data starts on the next line and runs until the next control line.
/// A missing scratch file leaves a gap. An output that already exists is never
/// appended to: decoding stops and the report is flagged `already_exists`.
pub fn assemble(segments: &[Segment], dir: &Path) -> std::io::Result<AssembleReport> {
    let mut report = AssembleReport::default();
    let mut output: Option<(BufWriter<File>, PathBuf)> = None;
    let mut decoded = Vec::new();

    for segment in segments {
        let path = scratch_path(dir, &segment.message_id);
        let scratch = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    segment = segment.number,
                    message_id = %segment.message_id,
                    "Scratch file missing, leaving gap"
                );
                report.segments_missing += 1;
                continue;
            }
            Err(e) => return Err(e),
        };
        let mut lines = BufReader::new(scratch).split(b'\n');

        // Header phase
        let mut in_body = false;
        for line in lines.by_ref() {
            let line = line?;
            let line = trim_cr(&line);
            if !is_control_line(line) {
                continue;
            }
            let Ok(words) = parse_control_line(&String::from_utf8_lossy(line)) else {
                continue;
            };
            if output.is_none()
                && let Some(name) = words.get("name")
            {
                match open_output(dir, name)? {
                    Output::Created(writer, path) => output = Some((writer, path)),
                    Output::Existing(path) => {
                        tracing::info!(path = %path.display(), "Output already exists, not appending");
                        report.output = Some(path);
                        report.already_exists = true;
                        return Ok(report);
                    }
                }
            }
            if !words.contains_key("part") {
                in_body = true;
                break;
            }
        }

        let Some((writer, _)) = output.as_mut() else {
            tracing::warn!(
                segment = segment.number,
                message_id = %segment.message_id,
                "Segment has no yEnc header naming the output, skipping"
            );
            continue;
        };
        if !in_body {
            continue;
        }

        // Data phase
        for line in lines {
            let line = line?;
            let line = trim_cr(&line);
            if is_control_line(line) {
                break;
            }
            decoded.clear();
            decode_into(line, &mut decoded);
            writer.write_all(&decoded)?;
            report.bytes_written += decoded.len() as u64;
        }
    }

    if let Some((mut writer, path)) = output {
        writer.flush()?;
        report.output = Some(path);
    }
    Ok(report)
}

enum Output {
    Created(BufWriter<File>, PathBuf),
    Existing(PathBuf),
}

fn open_output(dir: &Path, name: &str) -> std::io::Result<Output> {
    let file_name = output_file_name(name).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("unusable output name in yEnc header: '{}'", name),
        )
    })?;
    let path = dir.join(file_name);
    let file = match OpenOptions::new().create_new(true).append(true).open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(Output::Existing(path)),
        Err(e) => return Err(e),
    };
    tracing::debug!(path = %path.display(), "Created output file");
    Ok(Output::Created(BufWriter::new(file), path))
}

fn trim_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}
