//! Card composition.
//!
//! Both the full form and the quick defaults path go through
//! [`build_card`], so a card is either valid or never built.

use chrono::{DateTime, Utc};
use linkcard_capture_engine::{CaptureSession, CapturedMedia, SessionState};
use linkcard_card_model::{
    join_tags, split_tags, ArtifactRef, CardColor, CardDefaults, CardType, LayoutStyle, MediaCard,
    MediaOrigin, ValidationError, DEFAULT_CARD_WIDTH, MAX_BLUR_LEVEL,
};

use crate::resolver::{derive_thumbnail, infer_type, random_seed, ThumbnailCandidates};

/// Title and description shown in previews before the creator types any.
const PREVIEW_TITLE: &str = "Título do Card";
const PREVIEW_DESCRIPTION: &str = "Descrição do card...";
const PREVIEW_THUMBNAIL: &str = "https://images.unsplash.com/photo-1618005182384-a83a8bd57fbe?q=80&w=2564&auto=format&fit=crop";

#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Capture is still {state}; stop or cancel it before composing")]
    CaptureInProgress { state: SessionState },
}

/// Everything a creator types into the full form.
#[derive(Debug, Clone, PartialEq)]
pub struct CardForm {
    pub card_type: CardType,
    pub title: String,
    pub description: String,
    pub credit_cost: u32,
    pub category: String,
    pub group: String,
    /// Comma-delimited, as typed.
    pub tags: String,
    /// Seconds.
    pub duration: u32,
    /// Minutes; stored on the card in seconds.
    pub expiry_minutes: u32,
    pub repeat_interval: u32,
    pub is_blur: bool,
    /// Clamped to 0..=100 when the card is built.
    pub blur_level: u32,
    pub layout_style: LayoutStyle,
    pub card_color: CardColor,
    pub default_width: u32,
}

impl Default for CardForm {
    fn default() -> Self {
        Self {
            card_type: CardType::Image,
            title: String::new(),
            description: String::new(),
            credit_cost: 10,
            category: "Premium".to_string(),
            group: "Geral".to_string(),
            tags: String::new(),
            duration: 60,
            expiry_minutes: 0,
            repeat_interval: 0,
            is_blur: true,
            blur_level: 30,
            layout_style: LayoutStyle::Classic,
            card_color: CardColor::Navy,
            default_width: DEFAULT_CARD_WIDTH,
        }
    }
}

impl CardForm {
    /// Form populated from an existing card.
    pub fn from_card(card: &MediaCard) -> Self {
        Self {
            card_type: card.card_type,
            title: card.title.clone(),
            description: card.description.clone(),
            credit_cost: card.credit_cost,
            category: card.category.clone(),
            group: if card.group.is_empty() {
                "Geral".to_string()
            } else {
                card.group.clone()
            },
            tags: join_tags(&card.tags),
            duration: card.duration,
            expiry_minutes: card.expiry_minutes(),
            repeat_interval: card.repeat_interval,
            is_blur: card.is_blur,
            blur_level: u32::from(card.blur_level),
            layout_style: card.layout_style,
            card_color: card.card_color.clone(),
            default_width: card.default_width,
        }
    }
}

/// Where a card's fields come from.
#[derive(Debug, Clone, Copy)]
pub enum CardSource<'a> {
    Form(&'a CardForm),
    /// Saved defaults; the type comes from the uploaded media.
    Template {
        defaults: &'a CardDefaults,
        card_type: CardType,
    },
}

/// The artifact a card is built around.
#[derive(Debug, Clone, Copy, Default)]
pub struct MediaInput<'a> {
    pub media: Option<&'a ArtifactRef>,
    /// Still frame captured with a video recording.
    pub frame: Option<&'a ArtifactRef>,
    pub origin: MediaOrigin,
}

impl<'a> MediaInput<'a> {
    pub fn captured(captured: &'a CapturedMedia) -> Self {
        Self {
            media: Some(&captured.media),
            frame: captured.frame.as_ref(),
            origin: captured.origin,
        }
    }

    pub fn upload(media: &'a ArtifactRef) -> Self {
        Self {
            media: Some(media),
            frame: None,
            origin: MediaOrigin::Upload,
        }
    }
}

/// Identity of a card being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTarget {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

/// Context shared by both sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions<'a> {
    pub custom_thumbnail: Option<&'a ArtifactRef>,
    pub default_thumbnail: Option<&'a ArtifactRef>,
    /// Keep this id and creation time instead of minting new ones.
    pub existing: Option<&'a EditTarget>,
    pub creator_id: Option<&'a str>,
}

/// Build and validate a card.
pub fn build_card(
    source: CardSource<'_>,
    input: MediaInput<'_>,
    options: BuildOptions<'_>,
) -> Result<MediaCard, ValidationError> {
    let media = input.media.filter(|m| !m.is_empty());

    let mut card = match source {
        CardSource::Form(form) => card_from_form(form),
        CardSource::Template {
            defaults,
            card_type,
        } => card_from_template(defaults, card_type),
    };

    if card.card_type.requires_media() && media.is_none() {
        return Err(ValidationError::MissingMedia {
            card_type: card.card_type,
        });
    }

    card.thumbnail = derive_thumbnail(
        &ThumbnailCandidates {
            card_type: card.card_type,
            custom: options.custom_thumbnail,
            default: options.default_thumbnail,
            media,
            captured_frame: input.frame,
        },
        &random_seed(),
    );
    card.media_url = media.cloned();
    card.media_origin = if media.is_some() {
        input.origin
    } else {
        MediaOrigin::None
    };
    card.creator_id = options.creator_id.map(str::to_string);

    match options.existing {
        Some(target) => {
            card.id = target.id.clone();
            card.created_at = target.created_at;
        }
        None => {
            card.id = uuid::Uuid::new_v4().to_string();
            card.created_at = Utc::now();
        }
    }

    card.validate()?;
    Ok(card)
}

fn card_from_form(form: &CardForm) -> MediaCard {
    let title = form.title.trim();
    let title = if title.is_empty() {
        format!("Novo Card {}", form.card_type)
    } else {
        title.to_string()
    };

    MediaCard {
        title,
        description: form.description.clone(),
        credit_cost: form.credit_cost,
        category: form.category.clone(),
        group: form.group.clone(),
        tags: split_tags(&form.tags),
        duration: form.duration,
        expiry_seconds: form.expiry_minutes.saturating_mul(60),
        repeat_interval: form.repeat_interval,
        is_blur: form.is_blur,
        blur_level: clamp_blur(form.blur_level),
        layout_style: form.layout_style,
        card_color: form.card_color.clone(),
        default_width: width_or_default(form.default_width),
        ..blank_card(form.card_type)
    }
}

fn card_from_template(defaults: &CardDefaults, card_type: CardType) -> MediaCard {
    MediaCard {
        title: defaults.title.clone(),
        description: defaults.description.clone(),
        credit_cost: defaults.credit_cost,
        category: defaults.category.clone(),
        group: defaults.group.clone(),
        tags: defaults.tag_list(),
        duration: defaults.duration,
        expiry_seconds: defaults.expiry_minutes.saturating_mul(60),
        repeat_interval: defaults.repeat_interval,
        is_blur: true,
        blur_level: clamp_blur(u32::from(defaults.blur_level)),
        layout_style: defaults.layout_style,
        card_color: defaults.card_color.clone(),
        default_width: width_or_default(defaults.default_width),
        ..blank_card(card_type)
    }
}

fn blank_card(card_type: CardType) -> MediaCard {
    MediaCard {
        id: String::new(),
        card_type,
        title: String::new(),
        description: String::new(),
        credit_cost: 0,
        category: String::new(),
        group: String::new(),
        tags: Vec::new(),
        duration: 0,
        expiry_seconds: 0,
        repeat_interval: 0,
        is_blur: false,
        blur_level: 0,
        layout_style: LayoutStyle::Classic,
        card_color: CardColor::Navy,
        default_width: DEFAULT_CARD_WIDTH,
        thumbnail: ArtifactRef::url(""),
        media_url: None,
        creator_id: None,
        media_origin: MediaOrigin::None,
        save_to_gallery: true,
        created_at: Utc::now(),
    }
}

fn clamp_blur(level: u32) -> u8 {
    level.min(u32::from(MAX_BLUR_LEVEL)) as u8
}

fn width_or_default(width: u32) -> u32 {
    if width == 0 {
        DEFAULT_CARD_WIDTH
    } else {
        width
    }
}

/// Composer state behind the card editor.
#[derive(Debug, Clone, Default)]
pub struct CardComposer {
    form: CardForm,
    upload: Option<ArtifactRef>,
    custom_thumbnail: Option<ArtifactRef>,
    default_thumbnail: Option<ArtifactRef>,
    editing: Option<EditTarget>,
    creator_id: Option<String>,
}

impl CardComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute composed cards to this creator.
    pub fn with_creator(mut self, creator_id: Option<String>) -> Self {
        self.creator_id = creator_id;
        self
    }

    pub fn form(&self) -> &CardForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut CardForm {
        &mut self.form
    }

    pub fn card_type(&self) -> CardType {
        self.form.card_type
    }

    pub fn set_type(&mut self, card_type: CardType) {
        self.form.card_type = card_type;
    }

    /// Use an uploaded file as the card's media. A recognizable MIME type
    /// also switches the card type.
    pub fn set_upload(&mut self, media: ArtifactRef, mime: Option<&str>) {
        if let Some(mime) = mime.or(media.mime()) {
            self.form.card_type = infer_type(mime, self.form.card_type);
        }
        self.upload = Some(media);
    }

    pub fn upload(&self) -> Option<&ArtifactRef> {
        self.upload.as_ref()
    }

    pub fn set_custom_thumbnail(&mut self, thumbnail: Option<ArtifactRef>) {
        self.custom_thumbnail = thumbnail;
    }

    pub fn custom_thumbnail(&self) -> Option<&ArtifactRef> {
        self.custom_thumbnail.as_ref()
    }

    /// Thumbnail saved with the defaults template.
    pub fn set_default_thumbnail(&mut self, thumbnail: Option<ArtifactRef>) {
        self.default_thumbnail = thumbnail;
    }

    pub fn editing(&self) -> Option<&EditTarget> {
        self.editing.as_ref()
    }

    /// Drop the current media and custom thumbnail and release any capture.
    pub fn reset_media(&mut self, session: &mut CaptureSession) {
        self.upload = None;
        self.custom_thumbnail = None;
        session.reset();
    }

    /// Start over with a blank form for a new card.
    pub fn clear(&mut self, session: &mut CaptureSession) {
        self.form = CardForm::default();
        self.editing = None;
        self.reset_media(session);
    }

    /// Load an existing card for editing.
    ///
    /// The card's media is adopted by `session` as a finished capture and
    /// its thumbnail becomes the custom thumbnail, so composing again
    /// without changes reproduces the card.
    pub fn edit(&mut self, card: &MediaCard, session: &mut CaptureSession) {
        self.form = CardForm::from_card(card);
        self.upload = None;
        self.custom_thumbnail = Some(card.thumbnail.clone()).filter(|t| !t.is_empty());
        self.editing = Some(EditTarget {
            id: card.id.clone(),
            created_at: card.created_at,
        });

        match card.media_url.clone() {
            Some(media) if !media.is_empty() => {
                session.adopt(CapturedMedia::existing(media, None));
            }
            _ => session.reset(),
        }
        tracing::debug!(card_id = %card.id, card_type = %card.card_type, "Editing card");
    }

    /// Build a card from the full form.
    ///
    /// A finished capture in `session` takes priority over an upload.
    /// Sessions that are still acquiring, previewing, or recording are
    /// refused so a half-written artifact is never emitted.
    pub fn compose(&self, session: &CaptureSession) -> Result<MediaCard, ComposeError> {
        if session.is_busy() {
            return Err(ComposeError::CaptureInProgress {
                state: session.state(),
            });
        }

        let input = self.media_input(session);
        let card = build_card(
            CardSource::Form(&self.form),
            input,
            BuildOptions {
                custom_thumbnail: self.custom_thumbnail.as_ref(),
                default_thumbnail: self.default_thumbnail.as_ref(),
                existing: self.editing.as_ref(),
                creator_id: self.creator_id.as_deref(),
            },
        )?;

        tracing::info!(
            card_id = %card.id,
            card_type = %card.card_type,
            origin = ?card.media_origin,
            editing = self.editing.is_some(),
            "Card composed"
        );
        Ok(card)
    }

    /// Build a card from saved defaults and a single media file.
    ///
    /// The type is inferred from `mime` (or the artifact's own MIME type),
    /// falling back to the currently selected type.
    pub fn compose_from_defaults(
        &self,
        defaults: &CardDefaults,
        default_thumbnail: Option<&ArtifactRef>,
        media: &ArtifactRef,
        mime: Option<&str>,
        creator_id: Option<&str>,
    ) -> Result<MediaCard, ComposeError> {
        let card_type = mime
            .or(media.mime())
            .map(|m| infer_type(m, self.form.card_type))
            .unwrap_or(self.form.card_type);

        if media.is_empty() {
            return Err(ValidationError::MissingMedia { card_type }.into());
        }

        let card = build_card(
            CardSource::Template {
                defaults,
                card_type,
            },
            MediaInput::upload(media),
            BuildOptions {
                custom_thumbnail: self.custom_thumbnail.as_ref(),
                default_thumbnail: default_thumbnail.or(self.default_thumbnail.as_ref()),
                existing: None,
                creator_id: creator_id.or(self.creator_id.as_deref()),
            },
        )?;

        tracing::info!(card_id = %card.id, card_type = %card.card_type, "Card composed from defaults");
        Ok(card)
    }

    /// Unvalidated card reflecting the form as it stands, for live preview.
    pub fn preview(&self, session: &CaptureSession) -> MediaCard {
        let input = if session.is_busy() {
            MediaInput::default()
        } else {
            self.media_input(session)
        };

        let mut card = card_from_form(&self.form);
        if self.form.title.trim().is_empty() {
            card.title = PREVIEW_TITLE.to_string();
        }
        if self.form.description.trim().is_empty() {
            card.description = PREVIEW_DESCRIPTION.to_string();
        }
        card.id = "preview".to_string();
        card.thumbnail = [
            self.custom_thumbnail.as_ref(),
            self.default_thumbnail.as_ref(),
            input.media,
        ]
        .into_iter()
        .flatten()
        .find(|a| !a.is_empty())
        .cloned()
        .unwrap_or_else(|| ArtifactRef::url(PREVIEW_THUMBNAIL));
        card.media_url = input.media.cloned();
        card.creator_id = self.creator_id.clone();
        card
    }

    fn media_input<'a>(&'a self, session: &'a CaptureSession) -> MediaInput<'a> {
        match (session.captured(), self.upload.as_ref()) {
            (Some(captured), _) => MediaInput::captured(captured),
            (None, Some(upload)) => MediaInput::upload(upload),
            (None, None) => MediaInput::default(),
        }
    }
}
