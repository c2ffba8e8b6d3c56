use base64::Engine as _;

use crate::foundation::error::{CollageError, CollageResult};

const DATA_URL_PREFIX: &str = "data:";
const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Return `true` for locators that already carry their payload inline.
pub fn is_data_url(url: &str) -> bool {
    url.get(..DATA_URL_PREFIX.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(DATA_URL_PREFIX))
}

/// Encode bytes as a `data:<mime>;base64,<payload>` URL.
///
/// Without a usable content type, the media type is sniffed from the bytes and falls back to
/// `application/octet-stream`.
pub fn encode_data_url(bytes: &[u8], content_type: Option<&str>) -> String {
    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(str::trim)
        .filter(|ct| !ct.is_empty())
        .map(str::to_owned)
        .or_else(|| sniff_media_type(bytes).map(str::to_owned))
        .unwrap_or_else(|| FALLBACK_MEDIA_TYPE.to_owned());
    let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("{DATA_URL_PREFIX}{mime};base64,{payload}")
}

/// Guess a raster media type from magic bytes.
pub fn sniff_media_type(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes).ok().map(|f| f.to_mime_type())
}

/// Decode a `data:` URL into its bytes and media type.
pub fn decode_data_url(url: &str) -> CollageResult<(Vec<u8>, Option<String>)> {
    if !is_data_url(url) {
        return Err(CollageError::validation("URL does not start with 'data:'"));
    }
    let rest = &url[DATA_URL_PREFIX.len()..];
    let (meta, data) = rest
        .split_once(',')
        .ok_or_else(|| CollageError::validation("missing comma in data URL"))?;

    let mut parts = meta.split(';');
    let media = parts
        .next()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_owned);
    let is_base64 = parts.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        let cleaned: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        base64::engine::general_purpose::STANDARD
            .decode(cleaned)
            .map_err(|e| CollageError::validation(format!("invalid base64 in data URL: {e}")))?
    } else {
        percent_decode(data)?
    };
    Ok((bytes, media))
}

fn percent_decode(input: &str) -> CollageResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = input
                .get(i + 1..i + 3)
                .ok_or_else(|| CollageError::validation("truncated percent escape in data URL"))?;
            let v = u8::from_str_radix(hex, 16).map_err(|_| {
                CollageError::validation(format!("invalid percent escape \"%{hex}\" in data URL"))
            })?;
            out.push(v);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/data_url.rs"]
mod tests;
