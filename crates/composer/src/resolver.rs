//! Artifact resolution: card type inference and thumbnail selection.

use std::path::Path;

use linkcard_card_model::{ArtifactRef, CardType};

/// Placeholder image service used when nothing better is available.
pub const PLACEHOLDER_BASE_URL: &str = "https://picsum.photos/seed";

/// Infer the card type from a MIME type.
///
/// Unrecognized types leave `prior` unchanged.
pub fn infer_type(mime: &str, prior: CardType) -> CardType {
    let mime = mime.trim().to_ascii_lowercase();
    if mime.starts_with("image/") {
        CardType::Image
    } else if mime.starts_with("video/") {
        CardType::Video
    } else if mime.starts_with("audio/") {
        CardType::Audio
    } else {
        prior
    }
}

/// Everything that could become a card's thumbnail.
#[derive(Debug, Clone, Copy)]
pub struct ThumbnailCandidates<'a> {
    pub card_type: CardType,
    /// Thumbnail the creator picked for this card.
    pub custom: Option<&'a ArtifactRef>,
    /// Thumbnail saved alongside the defaults template.
    pub default: Option<&'a ArtifactRef>,
    pub media: Option<&'a ArtifactRef>,
    /// Still frame taken when a video recording stopped.
    pub captured_frame: Option<&'a ArtifactRef>,
}

impl<'a> ThumbnailCandidates<'a> {
    pub fn new(card_type: CardType) -> Self {
        Self {
            card_type,
            custom: None,
            default: None,
            media: None,
            captured_frame: None,
        }
    }
}

/// Pick the thumbnail by fixed precedence: custom, default, the media itself
/// for image cards, the captured frame for video cards, then a placeholder
/// keyed by `seed`. Empty candidates are skipped.
pub fn derive_thumbnail(candidates: &ThumbnailCandidates<'_>, seed: &str) -> ArtifactRef {
    let own_media = match candidates.card_type {
        CardType::Image => candidates.media,
        CardType::Video => candidates.captured_frame,
        CardType::Audio | CardType::Chat => None,
    };

    [candidates.custom, candidates.default, own_media]
        .into_iter()
        .flatten()
        .find(|artifact| !artifact.is_empty())
        .cloned()
        .unwrap_or_else(|| placeholder_thumbnail(seed))
}

pub fn placeholder_thumbnail(seed: &str) -> ArtifactRef {
    ArtifactRef::url(format!("{PLACEHOLDER_BASE_URL}/{seed}/800/600"))
}

/// Fresh seed for [`placeholder_thumbnail`].
pub fn random_seed() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..12].to_string()
}

/// Guess a MIME type from a file extension.
pub fn mime_from_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "opus" => "audio/opus",
        "m4a" => "audio/mp4",
        "flac" => "audio/flac",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inline(mime: &str, byte: u8) -> ArtifactRef {
        ArtifactRef::inline(mime, vec![byte])
    }

    #[test]
    fn infers_by_prefix() {
        assert_eq!(infer_type("video/webm", CardType::Image), CardType::Video);
        assert_eq!(infer_type("audio/ogg", CardType::Image), CardType::Audio);
        assert_eq!(infer_type("IMAGE/PNG", CardType::Chat), CardType::Image);
        assert_eq!(
            infer_type("application/octet-stream", CardType::Audio),
            CardType::Audio
        );
        assert_eq!(infer_type("", CardType::Chat), CardType::Chat);
    }

    #[test]
    fn custom_beats_default_and_media() {
        let custom = inline("image/png", 1);
        let default = inline("image/png", 2);
        let media = inline("image/png", 3);

        let candidates = ThumbnailCandidates {
            custom: Some(&custom),
            default: Some(&default),
            media: Some(&media),
            ..ThumbnailCandidates::new(CardType::Image)
        };
        assert_eq!(derive_thumbnail(&candidates, "s"), custom);

        let candidates = ThumbnailCandidates {
            custom: None,
            ..candidates
        };
        assert_eq!(derive_thumbnail(&candidates, "s"), default);

        let candidates = ThumbnailCandidates {
            default: None,
            ..candidates
        };
        assert_eq!(derive_thumbnail(&candidates, "s"), media);
    }

    #[test]
    fn video_uses_captured_frame_not_media() {
        let media = inline("video/webm", 1);
        let frame = inline("image/jpeg", 2);
        let mut candidates = ThumbnailCandidates {
            media: Some(&media),
            captured_frame: Some(&frame),
            ..ThumbnailCandidates::new(CardType::Video)
        };
        assert_eq!(derive_thumbnail(&candidates, "s"), frame);

        candidates.captured_frame = None;
        assert_eq!(
            derive_thumbnail(&candidates, "abc"),
            ArtifactRef::url("https://picsum.photos/seed/abc/800/600")
        );
    }

    #[test]
    fn audio_and_empty_candidates_fall_to_placeholder() {
        let media = inline("audio/webm", 1);
        let empty = ArtifactRef::url("  ");
        let candidates = ThumbnailCandidates {
            custom: Some(&empty),
            media: Some(&media),
            ..ThumbnailCandidates::new(CardType::Audio)
        };
        assert_eq!(
            derive_thumbnail(&candidates, "seed"),
            placeholder_thumbnail("seed")
        );
    }

    #[test]
    fn mime_table() {
        assert_eq!(mime_from_path(Path::new("clip.mp4")), "video/mp4");
        assert_eq!(mime_from_path(Path::new("/a/b/Photo.JPG")), "image/jpeg");
        assert_eq!(mime_from_path(Path::new("voice.opus")), "audio/opus");
        assert_eq!(
            mime_from_path(Path::new("notes")),
            "application/octet-stream"
        );
    }

    #[test]
    fn seeds_differ() {
        assert_ne!(random_seed(), random_seed());
        assert_eq!(random_seed().len(), 12);
    }
}
