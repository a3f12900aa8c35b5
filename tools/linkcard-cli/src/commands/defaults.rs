//! Manage the quick-mode defaults template.

use anyhow::Context;

use super::{load_artifact, AppContext, DefaultsArgs};

pub fn show(ctx: &AppContext) -> anyhow::Result<()> {
    let store = ctx.store();
    let defaults = store.load();

    println!("Defaults template: {}", store.template_path().display());
    println!("{}", serde_json::to_string_pretty(&defaults)?);
    match store.load_thumbnail() {
        Some(thumb) => println!("Default thumbnail: {thumb}"),
        None => println!("Default thumbnail: none"),
    }
    Ok(())
}

pub fn set(
    ctx: &AppContext,
    fields: DefaultsArgs,
    thumbnail: Option<String>,
) -> anyhow::Result<()> {
    let store = ctx.store();
    let mut defaults = store.load();
    fields.apply(&mut defaults);

    let thumbnail = thumbnail
        .map(|source| load_artifact(&source).map(|(artifact, _)| artifact))
        .transpose()?;
    store
        .save(&defaults, thumbnail.as_ref())
        .context("Failed to save defaults")?;

    println!("Defaults saved to: {}", store.template_path().display());
    Ok(())
}

pub fn reset(ctx: &AppContext) -> anyhow::Result<()> {
    let store = ctx.store();
    store.clear().context("Failed to reset defaults")?;
    println!("Defaults restored to the seed template");
    Ok(())
}
