/*
[INPUT]:  Account fields from flags or prompts
[OUTPUT]: Registered account, stored session, or cleared session
[POS]:    CLI layer - account commands
[UPDATE]: When login or registration flow changes
*/

use anyhow::{Result, bail};
use console::style;
use dialoguer::{Input, Password, theme::ColorfulTheme};
use taskr::validation::{self, PASSWORD_NOT_MET, PasswordCheck};

use super::AppContext;

pub async fn register(
    ctx: &AppContext,
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let theme = ColorfulTheme::default();
    let username = text_or_prompt(username, "Username", &theme)?;
    let email = text_or_prompt(email, "Email", &theme)?;
    let password = match password {
        Some(password) => password,
        None => Password::with_theme(&theme)
            .with_prompt("Password")
            .with_confirmation("Repeat password", "Passwords do not match")
            .interact()?,
    };

    if let Err(err) = validation::validate_registration(&username, &email, &password) {
        if err.to_string() == PASSWORD_NOT_MET {
            for rule in PasswordCheck::of(&password).unmet() {
                println!("  {} needs {}", style("x").red(), rule);
            }
        }
        return Err(err);
    }

    ctx.client
        .register(username.trim(), email.trim(), &password)
        .await?;
    tracing::info!(username = %username.trim(), "account registered");

    println!("{}", style("Account created.").green());
    println!("Log in with {}", style("taskr login").cyan());
    Ok(())
}

pub async fn login(ctx: &AppContext, email: Option<String>, password: Option<String>) -> Result<()> {
    let theme = ColorfulTheme::default();
    let email = text_or_prompt(email, "Email", &theme)?;
    let password = match password {
        Some(password) => password,
        None => Password::with_theme(&theme)
            .with_prompt("Password")
            .interact()?,
    };
    validation::validate_login(&email, &password)?;

    let user = ctx.client.login(email.trim(), &password).await?;
    ctx.prefs
        .save_login(user.id, &user.username, &user.email)
        .await?;
    tracing::info!(user_id = user.id, "logged in");

    println!(
        "{} {}",
        style("Welcome,").green(),
        style(display_name(&user.username, &user.email)).bold()
    );
    Ok(())
}

pub async fn logout(ctx: &AppContext) -> Result<()> {
    let Some(session) = ctx.prefs.session().await else {
        println!("{}", style("Not logged in.").yellow());
        return Ok(());
    };

    if let Some(store) = ctx.offline_store()? {
        store.clear_user(session.user_id)?;
    }
    ctx.prefs.logout().await?;
    tracing::info!(user_id = session.user_id, "logged out");

    println!("{}", style("Logged out.").green());
    Ok(())
}

pub async fn whoami(ctx: &AppContext) -> Result<()> {
    match ctx.prefs.session().await {
        Some(session) => {
            println!(
                "{} ({}) id {}",
                style(display_name(&session.username, &session.email)).bold(),
                session.email,
                session.user_id
            );
        }
        None => println!("{}", style("Not logged in.").yellow()),
    }
    Ok(())
}

fn text_or_prompt(value: Option<String>, prompt: &str, theme: &ColorfulTheme) -> Result<String> {
    if let Some(value) = value {
        return Ok(value);
    }
    let value: String = Input::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    if value.trim().is_empty() {
        bail!(validation::FILL_ALL_FIELDS);
    }
    Ok(value)
}

fn display_name<'a>(username: &'a str, email: &'a str) -> &'a str {
    if username.is_empty() { email } else { username }
}
