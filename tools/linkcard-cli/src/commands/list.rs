//! List the creator's cards.

use linkcard_composer::CardRepository;

use super::{print_card_summary, AppContext};

pub async fn run(ctx: &AppContext, json: bool) -> anyhow::Result<()> {
    let creator = ctx.require_creator()?;
    let cards = ctx.repository().list(&creator).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&cards)?);
        return Ok(());
    }

    if cards.is_empty() {
        println!("No cards yet for {creator}");
        return Ok(());
    }
    println!("{} card(s) for {creator}:", cards.len());
    for card in &cards {
        print_card_summary(card);
    }
    Ok(())
}
