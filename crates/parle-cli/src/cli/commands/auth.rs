//! Sign-in command handlers.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result};
use parle_core::config::Config;
use parle_core::credentials::CredentialStore;
use parle_core::gateway::{AuthOutcome, Backend};
use parle_core::validation::{validate_login, validate_registration};

/// Reads one line per prompt from stdin, prompting only on a terminal.
fn read_secrets(prompts: &[&str]) -> Result<Vec<String>> {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut lines = stdin.lock().lines();
    let mut secrets = Vec::with_capacity(prompts.len());

    for prompt in prompts {
        if interactive {
            eprint!("{prompt}: ");
            io::stderr().flush()?;
        }
        let line = lines
            .next()
            .transpose()
            .context("Failed to read from stdin")?
            .with_context(|| format!("{prompt} expected on stdin"))?;
        secrets.push(line.trim_end_matches(['\r', '\n']).to_string());
    }
    Ok(secrets)
}

fn report(outcome: &AuthOutcome, offline: bool) {
    if let Some(warning) = &outcome.profile_warning {
        eprintln!("Warning: {warning}");
    }
    if let Err(err) = Config::save_last_email(&outcome.session.email) {
        tracing::warn!("failed to save last email: {err:#}");
    }
    if offline {
        eprintln!("Note: offline sessions end when this command exits.");
    }
}

pub async fn login(config: &Config, offline: bool, email: &str) -> Result<()> {
    let secrets = read_secrets(&["Password"])?;
    let password = &secrets[0];
    validate_login(email, password)?;

    let backend = Backend::from_config(config, offline)?;
    let outcome = backend
        .auth
        .login(email.trim(), password)
        .await
        .context("Sign-in failed")?;

    println!("Signed in as {}", outcome.session.email);
    report(&outcome, offline);
    Ok(())
}

pub async fn register(config: &Config, offline: bool, email: &str) -> Result<()> {
    let secrets = read_secrets(&["Password", "Confirm password"])?;
    validate_registration(email, &secrets[0], &secrets[1])?;

    let backend = Backend::from_config(config, offline)?;
    let outcome = backend
        .auth
        .register(email.trim(), &secrets[0])
        .await
        .context("Registration failed")?;

    println!("Account created for {}", outcome.session.email);
    report(&outcome, offline);
    Ok(())
}

pub fn logout() -> Result<()> {
    if CredentialStore::default_location().clear()? {
        println!("Signed out.");
    } else {
        println!("Not signed in.");
    }
    Ok(())
}

pub fn whoami() -> Result<()> {
    match CredentialStore::default_location().load()? {
        Some(creds) => println!("{} ({})", creds.email, creds.user_id),
        None => println!("Not signed in."),
    }
    Ok(())
}
