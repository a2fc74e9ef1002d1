//! Archive unpacking and legacy-encoding decoding.

use std::io::{Cursor, Read};

use encoding_rs::SHIFT_JIS;
use zip::ZipArchive;

use aozora_shared::{CorpusError, Result};

/// Largest text member accepted, in decompressed bytes.
const MAX_TEXT_BYTES: u64 = 64 * 1024 * 1024;

/// Return the bytes of the first `.txt` member of a zip archive.
pub(crate) fn extract_text_member(bytes: &[u8]) -> Result<Vec<u8>> {
    read_text_member(bytes, MAX_TEXT_BYTES)
}

/// Like [`extract_text_member`], failing once the member exceeds `limit` bytes.
///
/// The size recorded in the archive header is not trusted for allocation.
fn read_text_member(bytes: &[u8], limit: u64) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| CorpusError::Archive(format!("invalid zip: {e}")))?;

    for index in 0..archive.len() {
        let mut member = archive
            .by_index(index)
            .map_err(|e| CorpusError::Archive(format!("member {index}: {e}")))?;

        let is_text = member.is_file() && member.name().to_ascii_lowercase().ends_with(".txt");
        if !is_text {
            continue;
        }

        let name = member.name().to_string();
        let mut buf = Vec::new();
        (&mut member)
            .take(limit + 1)
            .read_to_end(&mut buf)
            .map_err(|e| CorpusError::Archive(format!("{name}: {e}")))?;
        if buf.len() as u64 > limit {
            return Err(CorpusError::Archive(format!(
                "{name}: larger than {limit} bytes"
            )));
        }
        return Ok(buf);
    }

    Err(CorpusError::Archive("no .txt member in archive".into()))
}

/// Decode Shift_JIS bytes, dropping anything that does not decode.
pub(crate) fn decode_shift_jis(bytes: &[u8]) -> String {
    let (text, had_errors) = SHIFT_JIS.decode_without_bom_handling(bytes);
    if had_errors {
        text.replace(char::REPLACEMENT_CHARACTER, "")
    } else {
        text.into_owned()
    }
}
