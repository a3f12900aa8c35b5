//! Compose a card with the full form.

use anyhow::Context;
use linkcard_capture_engine::CaptureMode;
use linkcard_card_model::CardType;
use linkcard_composer::{CardComposer, CardRepository};

use super::{load_artifact, print_card, record, AppContext, FormArgs};

pub async fn run(
    ctx: &AppContext,
    form: FormArgs,
    media: Option<String>,
    record_mode: Option<CaptureMode>,
    seconds: Option<u64>,
    thumbnail: Option<String>,
    preview: bool,
) -> anyhow::Result<()> {
    let store = ctx.store();
    let mut session = ctx.session();
    let mut composer = CardComposer::new().with_creator(ctx.creator());
    composer.set_default_thumbnail(store.load_thumbnail());

    if let Some(source) = media {
        let (artifact, mime) = load_artifact(&source)?;
        composer.set_upload(artifact, mime.as_deref());
    }
    if let Some(mode) = record_mode {
        composer.set_type(match mode {
            CaptureMode::Photo => CardType::Image,
            CaptureMode::Audio => CardType::Audio,
            CaptureMode::Video => CardType::Video,
        });
        record::capture(ctx, &mut session, mode, seconds).await?;
    }
    if let Some(source) = thumbnail {
        composer.set_custom_thumbnail(Some(load_artifact(&source)?.0));
    }

    // Explicit flags win over the type implied by the media.
    form.apply(composer.form_mut());

    if preview {
        let card = composer.preview(&session);
        println!("{}", serde_json::to_string_pretty(&card)?);
        session.reset();
        return Ok(());
    }

    let card = composer.compose(&session).context("Card not created")?;
    session.reset();

    ctx.repository()
        .submit(card.clone())
        .await
        .context("Failed to save card")?;
    print_card(&card);
    Ok(())
}
