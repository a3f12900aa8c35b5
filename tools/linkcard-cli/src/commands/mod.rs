pub mod check;
pub mod create;
pub mod defaults;
pub mod delete;
pub mod edit;
pub mod list;
pub mod quick;
pub mod record;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use linkcard_capture_engine::{get_backend, CaptureSession, MediaDevices};
use linkcard_card_model::{
    ArtifactRef, CardColor, CardDefaults, CardType, DefaultsStore, LayoutStyle, MediaCard,
};
use linkcard_common::config::AppConfig;
use linkcard_composer::{
    mime_from_path, CardForm, IdentityProvider, LocalCardRepository, StaticIdentity,
};

/// Everything a command needs from config and global flags.
pub struct AppContext {
    pub config: AppConfig,
    pub identity: StaticIdentity,
    synthetic: bool,
}

impl AppContext {
    pub fn new(config: AppConfig, synthetic: bool) -> Self {
        let identity = StaticIdentity::new(config.creator_id.clone());
        Self {
            config,
            identity,
            synthetic,
        }
    }

    pub fn store(&self) -> DefaultsStore {
        DefaultsStore::new(&self.config.data_dir, &self.config.defaults_namespace)
    }

    pub fn repository(&self) -> LocalCardRepository {
        LocalCardRepository::new(self.config.cards_path())
    }

    pub fn devices(&self) -> Arc<dyn MediaDevices> {
        get_backend(&self.config.capture, self.synthetic)
    }

    pub fn session(&self) -> CaptureSession {
        CaptureSession::new(self.devices(), &self.config.capture)
    }

    pub fn creator(&self) -> Option<String> {
        self.identity.current_user()
    }

    pub fn require_creator(&self) -> anyhow::Result<String> {
        self.creator().context(
            "No creator id configured; pass --user or set creator_id in the config file",
        )
    }
}

/// Card form fields. Unset flags keep the current value.
#[derive(Args, Debug, Default)]
pub struct FormArgs {
    /// image, audio, video, or chat
    #[arg(long = "type")]
    pub card_type: Option<CardType>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Unlock price in credits
    #[arg(long)]
    pub credit_cost: Option<u32>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub group: Option<String>,

    /// Comma-separated tags
    #[arg(long)]
    pub tags: Option<String>,

    /// Visible reveal window in seconds
    #[arg(long)]
    pub duration: Option<u32>,

    /// Expiry in minutes (0 = never)
    #[arg(long)]
    pub expiry: Option<u32>,

    /// Repeat interval (0 = one-shot)
    #[arg(long)]
    pub repeat: Option<u32>,

    /// Blur the card until unlocked
    #[arg(long)]
    pub blur: Option<bool>,

    /// Blur strength, 0-100
    #[arg(long)]
    pub blur_level: Option<u32>,

    /// classic or minimal
    #[arg(long)]
    pub layout: Option<LayoutStyle>,

    /// Palette name (navy, indigo, rose, emerald, amber, blue, black) or #rrggbb
    #[arg(long)]
    pub color: Option<CardColor>,

    /// Render width in pixels
    #[arg(long)]
    pub width: Option<u32>,
}

impl FormArgs {
    pub fn apply(self, form: &mut CardForm) {
        if let Some(v) = self.card_type {
            form.card_type = v;
        }
        if let Some(v) = self.title {
            form.title = v;
        }
        if let Some(v) = self.description {
            form.description = v;
        }
        if let Some(v) = self.credit_cost {
            form.credit_cost = v;
        }
        if let Some(v) = self.category {
            form.category = v;
        }
        if let Some(v) = self.group {
            form.group = v;
        }
        if let Some(v) = self.tags {
            form.tags = v;
        }
        if let Some(v) = self.duration {
            form.duration = v;
        }
        if let Some(v) = self.expiry {
            form.expiry_minutes = v;
        }
        if let Some(v) = self.repeat {
            form.repeat_interval = v;
        }
        if let Some(v) = self.blur {
            form.is_blur = v;
        }
        if let Some(v) = self.blur_level {
            form.blur_level = v;
        }
        if let Some(v) = self.layout {
            form.layout_style = v;
        }
        if let Some(v) = self.color {
            form.card_color = v;
        }
        if let Some(v) = self.width {
            form.default_width = v;
        }
    }
}

/// Defaults template fields. Unset flags keep the saved value.
#[derive(Args, Debug, Default)]
pub struct DefaultsArgs {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub credit_cost: Option<u32>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub group: Option<String>,

    /// Comma-separated tags
    #[arg(long)]
    pub tags: Option<String>,

    /// Seconds
    #[arg(long)]
    pub duration: Option<u32>,

    /// Minutes (0 = never)
    #[arg(long)]
    pub expiry: Option<u32>,

    #[arg(long)]
    pub repeat: Option<u32>,

    /// 0-100
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub blur_level: Option<u8>,

    #[arg(long)]
    pub layout: Option<LayoutStyle>,

    #[arg(long)]
    pub color: Option<CardColor>,

    #[arg(long)]
    pub width: Option<u32>,
}

impl DefaultsArgs {
    pub fn apply(self, defaults: &mut CardDefaults) {
        if let Some(v) = self.title {
            defaults.title = v;
        }
        if let Some(v) = self.description {
            defaults.description = v;
        }
        if let Some(v) = self.credit_cost {
            defaults.credit_cost = v;
        }
        if let Some(v) = self.category {
            defaults.category = v;
        }
        if let Some(v) = self.group {
            defaults.group = v;
        }
        if let Some(v) = self.tags {
            defaults.tags = v;
        }
        if let Some(v) = self.duration {
            defaults.duration = v;
        }
        if let Some(v) = self.expiry {
            defaults.expiry_minutes = v;
        }
        if let Some(v) = self.repeat {
            defaults.repeat_interval = v;
        }
        if let Some(v) = self.blur_level {
            defaults.blur_level = v;
        }
        if let Some(v) = self.layout {
            defaults.layout_style = v;
        }
        if let Some(v) = self.color {
            defaults.card_color = v;
        }
        if let Some(v) = self.width {
            defaults.default_width = v;
        }
    }
}

/// Load an uploaded artifact from a file path or pass a URL through.
///
/// Returns the artifact and its MIME type when one can be told.
pub fn load_artifact(source: &str) -> anyhow::Result<(ArtifactRef, Option<String>)> {
    if source.starts_with("http://") || source.starts_with("https://") {
        return Ok((ArtifactRef::url(source), None));
    }

    let path = Path::new(source);
    let data = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mime = mime_from_path(path);
    tracing::debug!(path = %path.display(), mime, bytes = data.len(), "Loaded artifact");
    Ok((ArtifactRef::inline(mime, data), Some(mime.to_string())))
}

/// One-line summary used by several commands.
pub fn print_card_summary(card: &MediaCard) {
    println!(
        "{}  {:<5}  {:>4} credits  {}  ({})",
        card.id,
        card.card_type.as_str(),
        card.credit_cost,
        card.title,
        card.created_at.format("%Y-%m-%d %H:%M")
    );
}

/// Full card details.
pub fn print_card(card: &MediaCard) {
    println!("Card: {}", card.title);
    println!("  ID: {}", card.id);
    println!("  Type: {}", card.card_type);
    println!("  Created: {}", card.created_at);
    if let Some(creator) = &card.creator_id {
        println!("  Creator: {creator}");
    }
    println!();

    println!("Monetization:");
    println!("  Credit cost: {}", card.credit_cost);
    println!("  Category: {}", card.category);
    println!("  Group: {}", card.group);
    println!("  Tags: {}", card.tags.join(", "));
    println!();

    println!("Timing:");
    println!("  Duration: {}s", card.duration);
    if card.expiry_seconds == 0 {
        println!("  Expiry: never");
    } else {
        println!(
            "  Expiry: {}s ({} min)",
            card.expiry_seconds,
            card.expiry_minutes()
        );
    }
    println!("  Repeat interval: {}", card.repeat_interval);
    println!();

    println!("Appearance:");
    println!(
        "  Blur: {} (level {})",
        if card.is_blur { "on" } else { "off" },
        card.blur_level
    );
    println!("  Layout: {:?}", card.layout_style);
    println!("  Color: {}", card.card_color.hex());
    println!("  Width: {}px", card.default_width);
    println!("  Thumbnail: {}", card.thumbnail);
    match &card.media_url {
        Some(media) => println!("  Media: {media} ({:?})", card.media_origin),
        None => println!("  Media: none"),
    }
}
