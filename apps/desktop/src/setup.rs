use anyhow::{bail, Result};
use client_core::{CredentialField, FileCredentialStore, SetupWizard, StoreConnection};
use colored::Colorize;

use crate::{cli::SetupArgs, input::Prompter, render};

fn apply_args(wizard: &mut SetupWizard, args: &SetupArgs) {
    let fields = [
        (CredentialField::ApiKey, &args.api_key),
        (CredentialField::ProjectId, &args.project_id),
        (CredentialField::DatabaseUrl, &args.database_url),
        (CredentialField::AuthDomain, &args.auth_domain),
        (CredentialField::AppId, &args.app_id),
        (CredentialField::AuthToken, &args.auth_token),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            wizard.set_field(field, value.as_str());
        }
    }
}

/// Prompts for each field, showing what is already filled in. `false` once
/// stdin is closed.
async fn collect(wizard: &mut SetupWizard, prompter: &mut Prompter) -> Result<bool> {
    let input = wizard.input().clone();
    let fields = [
        (CredentialField::ApiKey, "apiKey", input.api_key),
        (CredentialField::ProjectId, "projectId", input.project_id),
        (
            CredentialField::DatabaseUrl,
            "databaseURL (optional)",
            input.database_url.unwrap_or_default(),
        ),
        (
            CredentialField::AuthDomain,
            "authDomain (optional)",
            input.auth_domain.unwrap_or_default(),
        ),
        (
            CredentialField::StorageBucket,
            "storageBucket (optional)",
            input.storage_bucket.unwrap_or_default(),
        ),
        (
            CredentialField::MessagingSenderId,
            "messagingSenderId (optional)",
            input.messaging_sender_id.unwrap_or_default(),
        ),
        (
            CredentialField::AppId,
            "appId (optional)",
            input.app_id.unwrap_or_default(),
        ),
        (
            CredentialField::AuthToken,
            "database secret (optional)",
            input.auth_token.unwrap_or_default(),
        ),
    ];
    for (field, label, current) in fields {
        let Some(answer) = prompter.field(label, &current).await? else {
            return Ok(false);
        };
        wizard.set_field(field, answer);
    }
    Ok(true)
}

pub async fn run(
    args: SetupArgs,
    credentials: &FileCredentialStore,
    connection: &StoreConnection,
) -> Result<()> {
    let mut wizard = SetupWizard::new();
    apply_args(&mut wizard, &args);

    if args.is_complete() {
        wizard.next();
        let saved = wizard.submit(credentials, connection).await?;
        println!(
            "{} {} -> {}",
            "saved".green().bold(),
            saved.project_id,
            credentials.path().display()
        );
        return Ok(());
    }

    let mut prompter = Prompter::new();
    println!("{}\n", render::SETUP_INSTRUCTIONS);
    if prompter.line("Enter to continue... ").await?.is_none() {
        bail!("setup aborted");
    }
    wizard.next();

    loop {
        if !collect(&mut wizard, &mut prompter).await? {
            bail!("setup aborted");
        }
        match wizard.submit(credentials, connection).await {
            Ok(saved) => {
                println!(
                    "{} {} -> {}",
                    "saved".green().bold(),
                    saved.project_id,
                    credentials.path().display()
                );
                return Ok(());
            }
            Err(err) => println!("{}\n", render::failure(&err.to_string())),
        }
    }
}
