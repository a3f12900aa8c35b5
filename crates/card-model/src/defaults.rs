//! Card defaults template.

use serde::{Deserialize, Serialize};

use crate::card::{split_tags, CardColor, LayoutStyle, DEFAULT_CARD_WIDTH};

/// Monetization and appearance template applied by quick composition.
///
/// Tags stay a single comma-delimited string because the template is edited
/// as raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDefaults {
    pub title: String,
    pub description: String,
    pub credit_cost: u32,
    /// Reveal window in seconds.
    pub duration: u32,
    /// Expiry in minutes. Stored under `expirySeconds` for compatibility
    /// with templates written by the web client.
    #[serde(rename = "expirySeconds")]
    pub expiry_minutes: u32,
    pub group: String,
    pub tags: String,
    pub blur_level: u8,
    pub layout_style: LayoutStyle,
    pub default_width: u32,
    pub repeat_interval: u32,
    pub category: String,
    pub card_color: CardColor,
}

impl CardDefaults {
    /// Tags as an ordered list.
    pub fn tag_list(&self) -> Vec<String> {
        split_tags(&self.tags)
    }
}

impl Default for CardDefaults {
    fn default() -> Self {
        Self {
            title: "Conteúdo Exclusivo".to_string(),
            description: "Toque para desbloquear.".to_string(),
            credit_cost: 10,
            duration: 60,
            expiry_minutes: 0,
            group: "Geral".to_string(),
            tags: "premium, vip".to_string(),
            blur_level: 30,
            layout_style: LayoutStyle::Classic,
            default_width: DEFAULT_CARD_WIDTH,
            repeat_interval: 0,
            category: "Premium".to_string(),
            card_color: CardColor::Navy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_values() {
        let seed = CardDefaults::default();
        assert_eq!(seed.credit_cost, 10);
        assert_eq!(seed.tag_list(), vec!["premium", "vip"]);
        assert_eq!(seed.blur_level, 30);
        assert_eq!(seed.card_color, CardColor::Navy);
    }

    #[test]
    fn expiry_uses_legacy_key() {
        let value = serde_json::to_value(CardDefaults::default()).unwrap();
        assert_eq!(value["expirySeconds"], 0);
        assert!(value.get("expiryMinutes").is_none());
    }
}
