use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::path::VirtualPath;

use super::Context;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadRequest {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadResponse {
    pub path: VirtualPath,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub path: String,
}

/// Streaming download handle. `file_name` is the raw base name;
/// `ascii_file_name` is a transliterated suggestion for transports that
/// cannot carry non-ASCII display names, separate from the raw path.
pub struct Download {
    pub path: VirtualPath,
    pub file_name: String,
    pub ascii_file_name: Option<String>,
    pub size: u64,
    pub reader: Box<dyn Read + Send>,
}

impl std::fmt::Debug for Download {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Download")
            .field("path", &self.path)
            .field("file_name", &self.file_name)
            .field("ascii_file_name", &self.ascii_file_name)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Whole-content read, passed through from the backend.
pub fn read_file(ctx: &Context, request: ReadRequest) -> Result<ReadResponse> {
    let path = VirtualPath::canonicalize(&request.path);
    let content = ctx.backend.read(&path)?;
    Ok(ReadResponse { path, content })
}

/// Streaming read with display-name handling at the boundary.
pub fn download(ctx: &Context, request: DownloadRequest) -> Result<Download> {
    let path = VirtualPath::canonicalize(&request.path);
    if !ctx.backend.has(&path)? {
        return Err(Error::NotFound(path));
    }
    if ctx.backend.size_of(&path)?.is_none() {
        return Err(Error::Validation(format!(
            "cannot stream a directory: {path}"
        )));
    }
    let (reader, size) = ctx.backend.read_stream(&path)?;
    let file_name = path.base_name().to_string();
    let ascii_file_name = if file_name.is_ascii() {
        None
    } else {
        Some(ascii_display_name(&file_name))
    };
    Ok(Download {
        path,
        file_name,
        ascii_file_name,
        size,
        reader,
    })
}

/// Best-effort ASCII transliteration for display names: common Latin
/// letters fold to their base letter, anything else unprintable becomes an
/// underscore.
fn ascii_display_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii() {
            out.push(ch);
            continue;
        }
        match fold_latin(ch) {
            Some(folded) => out.push_str(folded),
            None => out.push('_'),
        }
    }
    out
}

fn fold_latin(ch: char) -> Option<&'static str> {
    Some(match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => "A",
        'ç' => "c",
        'Ç' => "C",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'È' | 'É' | 'Ê' | 'Ë' => "E",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'Ì' | 'Í' | 'Î' | 'Ï' => "I",
        'ñ' => "n",
        'Ñ' => "N",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => "o",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => "O",
        'ù' | 'ú' | 'û' | 'ü' => "u",
        'Ù' | 'Ú' | 'Û' | 'Ü' => "U",
        'ý' | 'ÿ' => "y",
        'Ý' => "Y",
        'ß' => "ss",
        'æ' => "ae",
        'Æ' => "AE",
        'œ' => "oe",
        'Œ' => "OE",
        _ => return None,
    })
}
