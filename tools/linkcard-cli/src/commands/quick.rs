//! Publish a card from the saved defaults.

use anyhow::Context;
use linkcard_composer::{CardComposer, CardRepository};

use super::{load_artifact, print_card, AppContext};

pub async fn run(ctx: &AppContext, media: String, mime: Option<String>) -> anyhow::Result<()> {
    let store = ctx.store();
    let defaults = store.load();
    let default_thumbnail = store.load_thumbnail();

    let (artifact, guessed_mime) = load_artifact(&media)?;
    let mime = mime.or(guessed_mime);

    let creator = ctx.creator();
    let card = CardComposer::new()
        .compose_from_defaults(
            &defaults,
            default_thumbnail.as_ref(),
            &artifact,
            mime.as_deref(),
            creator.as_deref(),
        )
        .context("Quick compose failed")?;

    ctx.repository()
        .submit(card.clone())
        .await
        .context("Failed to save card")?;

    print_card(&card);
    Ok(())
}
