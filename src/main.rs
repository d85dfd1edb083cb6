use anyhow::Context;
use clap::Parser;
use pocket_lint::config::cli::{CliConfig, Command};
use pocket_lint::core::{Credential, ItemRequest, PocketApi, Session};
use pocket_lint::domain::model::{DetailType, Sort};
use pocket_lint::utils::logger::{self, LogFormat};
use pocket_lint::utils::validation::Validate;
use pocket_lint::{modify, ErrorKind, PocketClient, PocketError, Settings};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    logger::init_logger(cli.verbose, format);
    tracing::debug!("CLI config: {:?}", cli);

    let settings = Settings::from_file(&cli.config)
        .with_context(|| format!("failed to load settings from {}", cli.config));
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            eprintln!("💡 Create {} containing: consumer_key = \"<your key>\"", cli.config);
            std::process::exit(1);
        }
    };

    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        report(&e);
        std::process::exit(exit_code(&e));
    }

    // Ctrl-C abandons whatever request is in flight.
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let client = PocketClient::from_settings(&settings)?.with_cancellation(cancel);

    match run(&client, &settings, cli.command).await {
        Ok(message) => {
            println!("{}", message);
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ {} (kind: {:?})", e, e.kind());
            report(&e);
            std::process::exit(exit_code(&e));
        }
    }
}

async fn run(
    client: &PocketClient,
    settings: &Settings,
    command: Command,
) -> Result<String, PocketError> {
    match command {
        Command::Auth => {
            let token = client.authenticate(&settings.credential()).await?;
            let url = settings.endpoints.user_authorisation_url(&token)?;
            Ok(format!(
                "Open this URL in your browser and approve access:\n\n  {}\n\nthen run:\n\n  pocket-lint authorise {}",
                url, token.code
            ))
        }
        Command::Authorise { code } => {
            let credential: Credential = settings.credential();
            let grant = client.authorise(&credential, &code).await?;
            Ok(format!(
                "Authorised as {}. Add this line to your settings file:\n\naccess_token = \"{}\"",
                grant.username, grant.access_token
            ))
        }
        Command::Retrieve {
            count,
            state,
            tag,
            search,
        } => {
            let request = ItemRequest {
                count: Some(count),
                state: state.map(Into::into),
                tag,
                search,
                sort: Some(Sort::Newest),
                detail_type: Some(DetailType::Simple),
                ..ItemRequest::new(&settings.session()?)
            };
            let response = client.retrieve(&request).await?;

            if response.list.is_empty() {
                return Ok("No items found".to_string());
            }
            let lines: Vec<String> = response
                .list
                .values()
                .map(|item| {
                    let added = item
                        .added_at()
                        .map(|t| t.format("%Y-%m-%d").to_string())
                        .unwrap_or_default();
                    format!(
                        "{}\t{}\t{}{}\t{}",
                        item.item_id,
                        added,
                        if item.is_favorite() { "★ " } else { "" },
                        item.title(),
                        item.url().unwrap_or("")
                    )
                })
                .collect();
            Ok(lines.join("\n"))
        }
        Command::Modify {
            action,
            item_id,
            args,
        } => apply(client, settings, &action, item_id, &args).await,
        Command::Archive { item_id } => apply(client, settings, "archive", item_id, &[]).await,
    }
}

async fn apply(
    client: &PocketClient,
    settings: &Settings,
    action: &str,
    item_id: i64,
    args: &[String],
) -> Result<String, PocketError> {
    // Credentials are checked inside `modify`, consumer key first.
    let session = Session::new(
        settings.consumer_key.trim(),
        settings.access_token.as_deref().unwrap_or_default().trim(),
    );
    modify(client, &session, action, item_id, args).await?;
    Ok("Update applied successfully".to_string())
}

fn report(e: &PocketError) {
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
}

fn exit_code(e: &PocketError) -> i32 {
    match e.kind() {
        ErrorKind::ConfigError => 1,
        ErrorKind::NetworkError => 2,
        ErrorKind::ProtocolError => 3,
        ErrorKind::RemoteRejection => 4,
    }
}
