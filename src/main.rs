use crate::config::cli::{Args, Command};
use crate::config::Config;
use crate::domain::storage::Storage;
use crate::error::{ArcadeError, Result};
use crate::infrastructure::{archive, Extractor, FeedClient, FileSystemStore};
use crate::services::RefreshService;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

mod config;
mod domain;
mod error;
mod infrastructure;
mod services;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    if let Err(e) = run(args).await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::from_args(args)?;
    let store = Arc::new(FileSystemStore::new(&config.args.store_file));
    let feed = FeedClient::new(config.http_client.clone(), config.args.feed_url.clone());
    let extractor = Extractor::new(config.args.table_policy);

    match &config.args.command {
        None | Some(Command::Refresh) => {
            let refresh = RefreshService::new(feed, extractor, store)
                .with_progress(!config.args.no_progress);
            let summary = refresh.refresh_all().await?;
            info!(
                "Stored {} tables for {} listed ROMs from {} rounds ({} skipped)",
                summary.tables_written,
                summary.games.len(),
                summary.rounds,
                summary.skipped.len()
            );
        }
        Some(Command::Newest) => {
            let post = feed
                .find_newest_round()
                .await?
                .ok_or_else(|| ArcadeError::NotFound("no tournament round in feed".to_string()))?;
            println!("Round {} ({}): {}", post.round, post.slug, post.title);
            for rom in extractor.extract_rom_names(&post.content_html) {
                println!("  {rom}");
            }
        }
        Some(Command::Games) => {
            let games = store
                .get_games_index()?
                .ok_or_else(|| ArcadeError::NotFound("games index, run `refresh` first".to_string()))?;
            for game in games {
                println!("{game}");
            }
        }
        Some(Command::Results { rom }) => {
            let table = store
                .get_table(rom)?
                .ok_or_else(|| ArcadeError::NotFound(format!("results for {rom}")))?;
            print_table(&table);
        }
        Some(Command::MergeNewest) => {
            let refresh = RefreshService::new(feed, extractor, store);
            let summary = refresh.merge_newest().await?;
            info!(
                "Merged {} tables from the newest round ({} skipped)",
                summary.tables_written,
                summary.skipped.len()
            );
        }
        Some(Command::FetchReplay { url, output }) => {
            config.ensure_directories()?;
            let target = output
                .clone()
                .unwrap_or_else(|| config.settings.inp_dir.join(replay_file_name(url)));
            let bundle = feed.fetch_replay_bundle(url).await?;
            let entry = archive::extract_replay(&bundle, &target)?;
            println!("{}", target.display());
            info!("Unpacked {entry} from {url}");
        }
        Some(Command::Package { inp, screenshot }) => {
            config.ensure_directories()?;
            let submission = archive::package_submission(
                &config.settings.inp_dir,
                &config.settings.output_dir,
                inp,
                screenshot.as_deref(),
            )?;
            println!("{}", submission.archive.display());
            if let Some(copied) = submission.screenshot {
                println!("{}", copied.display());
            }
        }
        Some(Command::Settings) => {
            println!("# {}", config.args.settings_file.display());
            for (key, value) in config.settings.entries() {
                println!("{key} = {}", value.display());
            }
        }
    }

    Ok(())
}

fn print_table(table: &domain::ResultTable) {
    let mut header = vec!["Player", "Score"];
    header.extend(table.extra_columns.iter().map(String::as_str));
    header.extend(["Avatar", "Input", "Screenshot"]);
    println!("{}", header.join("\t"));

    for row in &table.rows {
        let score = row.score.to_string();
        let mut cells = vec![row.player_name.as_str(), score.as_str()];
        cells.extend(row.extra.iter().map(String::as_str));
        cells.extend([
            row.avatar_url.as_deref().unwrap_or(""),
            row.input_url.as_deref().unwrap_or(""),
            row.screenshot_url.as_deref().unwrap_or(""),
        ]);
        println!("{}", cells.join("\t"));
    }
}

/// Stem of the last path segment of `url` with an `.inp` extension.
fn replay_file_name(url: &str) -> PathBuf {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let name = path.rsplit('/').next().unwrap_or_default();
    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    if stem.is_empty() {
        PathBuf::from("replay.inp")
    } else {
        PathBuf::from(format!("{stem}.inp"))
    }
}
