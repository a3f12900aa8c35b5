//! Edit an existing card.

use anyhow::Context;
use linkcard_composer::{CardComposer, CardRepository};

use super::{load_artifact, print_card, AppContext, FormArgs};

pub async fn run(
    ctx: &AppContext,
    id: String,
    form: FormArgs,
    media: Option<String>,
    thumbnail: Option<String>,
) -> anyhow::Result<()> {
    let repo = ctx.repository();
    let creator = ctx.require_creator()?;
    let existing = repo
        .get(&id)
        .await?
        .with_context(|| format!("No card with id {id}"))?;
    if existing.creator_id.as_deref() != Some(creator.as_str()) {
        anyhow::bail!("Card {id} belongs to another creator");
    }

    let mut session = ctx.session();
    let mut composer = CardComposer::new().with_creator(Some(creator));
    composer.edit(&existing, &mut session);

    if let Some(source) = media {
        let (artifact, mime) = load_artifact(&source)?;
        session.reset();
        composer.set_upload(artifact, mime.as_deref());
    }
    if let Some(source) = thumbnail {
        composer.set_custom_thumbnail(Some(load_artifact(&source)?.0));
    }
    form.apply(composer.form_mut());

    let card = composer.compose(&session).context("Card not updated")?;
    repo.submit(card.clone())
        .await
        .context("Failed to save card")?;

    print_card(&card);
    Ok(())
}
