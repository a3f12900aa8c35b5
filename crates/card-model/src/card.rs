//! Media card types.
//!
//! A card is the persisted unit of content: one media artifact gated by a
//! credit price, an optional reveal blur, and timing policies.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactRef;
use crate::error::ValidationError;

/// Render width used when none (or zero) is supplied.
pub const DEFAULT_CARD_WIDTH: u32 = 250;

/// Maximum reveal blur strength.
pub const MAX_BLUR_LEVEL: u8 = 100;

/// Kind of content a card carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    #[default]
    Image,
    Audio,
    Video,
    Chat,
}

impl CardType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Chat => "chat",
        }
    }

    /// Every type except chat needs a media artifact.
    pub fn requires_media(self) -> bool {
        self != Self::Chat
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(Self::Image),
            "audio" => Ok(Self::Audio),
            "video" => Ok(Self::Video),
            "chat" => Ok(Self::Chat),
            _ => Err(ValidationError::UnknownCardType {
                value: s.to_string(),
            }),
        }
    }
}

/// Card layout variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LayoutStyle {
    #[default]
    Classic,
    Minimal,
}

impl FromStr for LayoutStyle {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" => Ok(Self::Classic),
            "minimal" => Ok(Self::Minimal),
            _ => Err(ValidationError::UnknownLayout {
                value: s.to_string(),
            }),
        }
    }
}

/// How the card's media was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaOrigin {
    #[default]
    None,
    Upload,
    Record,
}

/// Card background color: one of the palette entries or a custom hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum CardColor {
    #[default]
    Navy,
    Indigo,
    Rose,
    Emerald,
    Amber,
    Blue,
    Black,
    /// Lowercase `#rrggbb`.
    Custom(String),
}

/// The fixed palette offered to creators, default first.
pub const CARD_PALETTE: [CardColor; 7] = [
    CardColor::Navy,
    CardColor::Indigo,
    CardColor::Rose,
    CardColor::Emerald,
    CardColor::Amber,
    CardColor::Blue,
    CardColor::Black,
];

impl CardColor {
    pub fn hex(&self) -> &str {
        match self {
            Self::Navy => "#0f172a",
            Self::Indigo => "#1e1b4b",
            Self::Rose => "#4c0519",
            Self::Emerald => "#022c22",
            Self::Amber => "#451a03",
            Self::Blue => "#172554",
            Self::Black => "#000000",
            Self::Custom(hex) => hex,
        }
    }

    /// Palette name, or `None` for custom colors.
    pub fn name(&self) -> Option<&'static str> {
        match self {
            Self::Navy => Some("navy"),
            Self::Indigo => Some("indigo"),
            Self::Rose => Some("rose"),
            Self::Emerald => Some("emerald"),
            Self::Amber => Some("amber"),
            Self::Blue => Some("blue"),
            Self::Black => Some("black"),
            Self::Custom(_) => None,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    /// Accepts a palette name or hex (any case), or any other `#rrggbb` value.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let hex = value.trim().to_ascii_lowercase();
        if let Some(color) = CARD_PALETTE
            .iter()
            .find(|c| c.hex() == hex || c.name() == Some(hex.as_str()))
        {
            return Ok(color.clone());
        }

        let digits = hex.strip_prefix('#').unwrap_or_default();
        if digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Self::Custom(hex))
        } else {
            Err(ValidationError::InvalidColor {
                value: value.to_string(),
            })
        }
    }
}

impl TryFrom<String> for CardColor {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CardColor> for String {
    fn from(color: CardColor) -> Self {
        color.hex().to_string()
    }
}

impl FromStr for CardColor {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// The persisted unit of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaCard {
    /// Opaque unique identifier.
    pub id: String,

    #[serde(rename = "type")]
    pub card_type: CardType,

    pub title: String,
    pub description: String,

    /// Unlock price in credits.
    pub credit_cost: u32,

    pub category: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub tags: Vec<String>,

    /// Visible reveal window in seconds.
    pub duration: u32,

    /// Seconds until the card expires; 0 never expires.
    #[serde(default)]
    pub expiry_seconds: u32,

    /// Recurrence interval; 0 is one-shot.
    #[serde(default)]
    pub repeat_interval: u32,

    pub is_blur: bool,
    pub blur_level: u8,

    #[serde(default)]
    pub layout_style: LayoutStyle,
    #[serde(default)]
    pub card_color: CardColor,

    /// Render width hint in pixels.
    pub default_width: u32,

    pub thumbnail: ArtifactRef,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<ArtifactRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<String>,

    #[serde(default)]
    pub media_origin: MediaOrigin,

    #[serde(default = "default_true")]
    pub save_to_gallery: bool,

    /// Set once at first emission.
    pub created_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl MediaCard {
    /// Check the invariants every emitted card must hold.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let has_media = self.media_url.as_ref().is_some_and(|m| !m.is_empty());
        if self.card_type.requires_media() && !has_media {
            return Err(ValidationError::MissingMedia {
                card_type: self.card_type,
            });
        }
        if self.thumbnail.is_empty() {
            return Err(ValidationError::MissingThumbnail);
        }
        if self.blur_level > MAX_BLUR_LEVEL {
            return Err(ValidationError::BlurOutOfRange {
                value: self.blur_level,
            });
        }
        if self.default_width == 0 {
            return Err(ValidationError::ZeroWidth);
        }
        Ok(())
    }

    /// Expiry in the minute units creators type in.
    pub fn expiry_minutes(&self) -> u32 {
        self.expiry_seconds / 60
    }
}

/// Split a comma-delimited tag string, trimming entries and dropping blanks.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Inverse of [`split_tags`] for display in an editable field.
pub fn join_tags(tags: &[String]) -> String {
    tags.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_card() -> MediaCard {
        MediaCard {
            id: "abc".to_string(),
            card_type: CardType::Image,
            title: "Sunset".to_string(),
            description: String::new(),
            credit_cost: 10,
            category: "Premium".to_string(),
            group: "Geral".to_string(),
            tags: vec!["premium".to_string()],
            duration: 60,
            expiry_seconds: 300,
            repeat_interval: 0,
            is_blur: true,
            blur_level: 30,
            layout_style: LayoutStyle::Classic,
            card_color: CardColor::Navy,
            default_width: DEFAULT_CARD_WIDTH,
            thumbnail: ArtifactRef::url("https://cdn.example.com/t.jpg"),
            media_url: Some(ArtifactRef::url("https://cdn.example.com/m.jpg")),
            creator_id: None,
            media_origin: MediaOrigin::Upload,
            save_to_gallery: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn card_serializes_with_client_field_names() {
        let card = sample_card();
        let value = serde_json::to_value(&card).unwrap();
        assert_eq!(value["type"], "image");
        assert_eq!(value["creditCost"], 10);
        assert_eq!(value["expirySeconds"], 300);
        assert_eq!(value["cardColor"], "#0f172a");
        assert_eq!(value["layoutStyle"], "classic");
        assert!(value.get("creatorId").is_none());

        let parsed: MediaCard = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, card);
    }

    #[test]
    fn validate_requires_media_except_for_chat() {
        let mut card = sample_card();
        card.media_url = None;
        assert_eq!(
            card.validate(),
            Err(ValidationError::MissingMedia {
                card_type: CardType::Image
            })
        );

        card.card_type = CardType::Chat;
        assert!(card.validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_fields() {
        let mut card = sample_card();
        card.blur_level = 101;
        assert!(matches!(
            card.validate(),
            Err(ValidationError::BlurOutOfRange { value: 101 })
        ));

        let mut card = sample_card();
        card.default_width = 0;
        assert_eq!(card.validate(), Err(ValidationError::ZeroWidth));
    }

    #[test]
    fn color_parsing_prefers_palette() {
        assert_eq!(CardColor::parse("#1E1B4B").unwrap(), CardColor::Indigo);
        assert_eq!(
            CardColor::parse("#abcdef").unwrap(),
            CardColor::Custom("#abcdef".to_string())
        );
        assert!(CardColor::parse("red").is_err());
        assert_eq!("Emerald".parse::<CardColor>().unwrap(), CardColor::Emerald);
        assert!(CardColor::parse("#12345").is_err());
    }

    #[test]
    fn palette_names_parse_but_serialize_as_hex() {
        for color in CARD_PALETTE {
            let name = color.name().unwrap();
            assert_eq!(name.parse::<CardColor>().unwrap(), color);
        }
        let json = serde_json::to_string(&"navy".parse::<CardColor>().unwrap()).unwrap();
        assert_eq!(json, "\"#0f172a\"");
        assert_eq!(CardColor::Custom("#abcdef".into()).name(), None);
    }

    #[test]
    fn card_type_parses_case_insensitively() {
        assert_eq!("Video".parse::<CardType>().unwrap(), CardType::Video);
        assert!("gif".parse::<CardType>().is_err());
        assert!(!CardType::Chat.requires_media());
    }

    #[test]
    fn split_tags_trims_and_drops_blanks() {
        assert_eq!(split_tags("premium, vip"), vec!["premium", "vip"]);
        assert_eq!(split_tags(" a ,, b , "), vec!["a", "b"]);
        assert!(split_tags("").is_empty());
    }

    proptest! {
        #[test]
        fn split_then_join_is_stable(tags in proptest::collection::vec("[a-z]{1,8}", 0..6)) {
            let joined = join_tags(&tags);
            prop_assert_eq!(split_tags(&joined), tags);
        }
    }
}
