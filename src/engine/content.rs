// ── Emotebank: Content Validation ──────────────────────────────────────────
// Name checks and image sniffing for the creation path. Decoding and resizing
// are out of scope; we only need to know "is this an image the platform will
// take" and "is it animated", both of which the container headers answer.

use crate::atoms::constants::{DESCRIPTION_MAX_LEN, MAX_EMOTE_BYTES, NAME_MAX_LEN, NAME_MIN_LEN};
use crate::atoms::error::{EmoteError, EmoteResult};
use regex::Regex;
use std::sync::LazyLock;

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+$").expect("name pattern is valid"));

/// Accept 2–32 word characters, the same shape the lexer recognises.
pub fn validate_name(name: &str) -> EmoteResult<()> {
    let len = name.chars().count();
    if (NAME_MIN_LEN..=NAME_MAX_LEN).contains(&len) && NAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(EmoteError::InvalidName { name: name.to_string() })
    }
}

pub fn validate_description(description: &str) -> EmoteResult<()> {
    let len = description.chars().count();
    if len > DESCRIPTION_MAX_LEN {
        return Err(EmoteError::DescriptionTooLong { len, max: DESCRIPTION_MAX_LEN });
    }
    Ok(())
}

/// Check the image container is one the platform takes and report whether
/// it carries animation.
pub fn sniff(image: &[u8]) -> EmoteResult<bool> {
    if image.len() > MAX_EMOTE_BYTES {
        return Err(EmoteError::ContentTooLarge { size: image.len(), max: MAX_EMOTE_BYTES });
    }

    if image.starts_with(b"\x89PNG\r\n\x1a\n") {
        Ok(png_has_animation(image))
    } else if image.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Ok(false)
    } else if image.starts_with(b"GIF87a") || image.starts_with(b"GIF89a") {
        // The platform stores every GIF emote as animated.
        Ok(true)
    } else if image.len() >= 12 && &image[0..4] == b"RIFF" && &image[8..12] == b"WEBP" {
        Ok(webp_has_animation(image))
    } else {
        Err(EmoteError::InvalidContent("not a PNG, JPEG, GIF or WebP image".into()))
    }
}

/// APNG: an `acTL` chunk appears before the first `IDAT`.
fn png_has_animation(image: &[u8]) -> bool {
    let mut pos = 8;
    while pos + 8 <= image.len() {
        let len = u32::from_be_bytes([image[pos], image[pos + 1], image[pos + 2], image[pos + 3]]) as usize;
        match &image[pos + 4..pos + 8] {
            b"acTL" => return true,
            b"IDAT" | b"IEND" => return false,
            _ => {}
        }
        // length + type + data + crc
        pos = match pos.checked_add(12).and_then(|p| p.checked_add(len)) {
            Some(next) => next,
            None => return false,
        };
    }
    false
}

/// Extended WebP: `VP8X` chunk with the animation flag (bit 1) set.
fn webp_has_animation(image: &[u8]) -> bool {
    image.len() >= 21 && &image[12..16] == b"VP8X" && image[20] & 0x02 != 0
}
