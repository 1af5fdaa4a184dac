//! Listing commands: `recommend` and `geocode`.

use anyhow::Result;
use console::style;

use crate::cli::thinking_spinner;
use crate::state::AppState;

/// Print recommended listings for a user.
pub async fn recommend(state: &AppState, user_id: &str, json: bool) -> Result<()> {
    let spinner = (!json).then(|| thinking_spinner("finding listings..."));
    let result = state.recommendations.recommend(user_id).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let recommendations = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recommendations)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Recommendations for {} {}",
        style("*").cyan().bold(),
        style(user_id).cyan(),
        style(format!("({})", recommendations.source)).dim()
    );
    println!();
    for property in &recommendations.properties {
        println!(
            "  {}  {} {}",
            style(&property.name).bold(),
            style(&property.price).green(),
            style(format!("(market avg {})", property.market_avg)).dim()
        );
        println!("    {}", property.description);
        println!("    {} {}", style("Why:").dim(), property.recommendation_reason);
        println!("    {}", style(&property.image).dim());
        println!();
    }
    Ok(())
}

/// Print geocoding matches for an address.
pub async fn geocode(state: &AppState, address: &str, json: bool) -> Result<()> {
    let results = state.geocoding.geocode(address).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "results": results }))?
        );
        return Ok(());
    }

    println!();
    if results.is_empty() {
        println!("  {} No matches for '{}'", style("?").yellow().bold(), address);
    }
    for result in &results {
        println!(
            "  {}  {}",
            style(format!("{:.6}, {:.6}", result.location.lat, result.location.lng)).cyan(),
            result.formatted_address
        );
    }
    println!();
    Ok(())
}
