/*
[INPUT]:  Optional dark-mode and text-size values
[OUTPUT]: Updated preferences and the current settings printout
[POS]:    CLI layer - display settings
[UPDATE]: When adding preference keys
*/

use anyhow::Result;
use console::style;

use super::AppContext;

pub async fn run(ctx: &AppContext, dark_mode: Option<bool>, text_size: Option<f32>) -> Result<()> {
    if let Some(enabled) = dark_mode {
        ctx.prefs.set_dark_mode(enabled).await?;
    }
    if let Some(size) = text_size {
        ctx.prefs.set_text_size(size).await?;
    }

    let prefs = ctx.prefs.snapshot().await;
    println!("{}", style("Settings").bold().underlined());
    println!(
        "  Dark mode  {}",
        if prefs.dark_mode { style("on").green() } else { style("off").dim() }
    );
    println!("  Text size  {}", prefs.text_size);
    match (&prefs.username, prefs.logged_in) {
        (Some(username), true) => println!("  Account    {username}"),
        _ => println!("  Account    {}", style("not logged in").dim()),
    }
    Ok(())
}
