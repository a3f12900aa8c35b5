//! Delete a card.

use linkcard_composer::CardRepository;

use super::AppContext;

pub async fn run(ctx: &AppContext, id: String) -> anyhow::Result<()> {
    let repo = ctx.repository();
    let creator = ctx.require_creator()?;

    let Some(card) = repo.get(&id).await? else {
        anyhow::bail!("No card with id {id}");
    };
    if card.creator_id.as_deref() != Some(creator.as_str()) {
        anyhow::bail!("Card {id} belongs to another creator");
    }

    repo.delete(&id).await?;
    println!("Deleted card {id} ({})", card.title);
    Ok(())
}
