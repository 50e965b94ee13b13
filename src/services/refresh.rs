use crate::domain::storage::Storage;
use crate::domain::{GamesIndex, StoreContents, TournamentPost};
use crate::error::{ArcadeError, ErrorKind, Result};
use crate::infrastructure::{Extractor, FeedClient};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub rounds: usize,
    pub games: GamesIndex,
    pub tables_written: usize,
    pub skipped: Vec<String>,
}

/// Scrapes every tournament round and replaces the local store with the
/// results.
///
/// Nothing is written until every round has been extracted, so a refresh
/// that aborts on a network or format error leaves the previous store as it
/// was.
pub struct RefreshService {
    feed: FeedClient,
    extractor: Extractor,
    store: Arc<dyn Storage>,
    show_progress: bool,
}

impl RefreshService {
    pub fn new(feed: FeedClient, extractor: Extractor, store: Arc<dyn Storage>) -> Self {
        Self {
            feed,
            extractor,
            store,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub async fn refresh_all(&self) -> Result<RefreshSummary> {
        info!("Refreshing results from {}", self.feed.feed_url());
        let rounds = self.feed.list_tournament_posts().await?;
        self.ingest(rounds.values())
    }

    /// Extracts `posts` and replaces the store with the outcome.
    pub fn ingest<'a>(
        &self,
        posts: impl ExactSizeIterator<Item = &'a TournamentPost>,
    ) -> Result<RefreshSummary> {
        let progress = if self.show_progress {
            let pb = ProgressBar::new(posts.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                    .map_err(|e| ArcadeError::Format(e.to_string()))?,
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut contents = StoreContents::new();
        let mut summary = RefreshSummary::default();

        for post in posts {
            progress.set_message(format!("round {}", post.round));
            self.ingest_post(post, &mut contents, &mut summary)?;
            summary.rounds += 1;
            progress.inc(1);
        }
        progress.finish_and_clear();

        log_duplicates(&summary.games);
        contents.put_games_index(summary.games.clone());
        summary.tables_written = contents.tables.len();
        self.store.replace_all(&contents)?;

        info!(
            rounds = summary.rounds,
            games = summary.games.len(),
            tables = summary.tables_written,
            skipped = summary.skipped.len(),
            "Refresh completed"
        );
        Ok(summary)
    }

    /// Adds the newest round's tables to the existing store.
    ///
    /// Tables of older rounds stay as they are. The round's ROM names are
    /// appended to the games index unless the index already lists them, so
    /// merging the same round twice does not grow it.
    pub async fn merge_newest(&self) -> Result<RefreshSummary> {
        let post = self
            .feed
            .find_newest_round()
            .await?
            .ok_or_else(|| ArcadeError::NotFound("no tournament round in feed".to_string()))?;
        self.merge(&post)
    }

    pub fn merge(&self, post: &TournamentPost) -> Result<RefreshSummary> {
        let mut staged = StoreContents::new();
        let mut summary = RefreshSummary {
            rounds: 1,
            ..RefreshSummary::default()
        };
        self.ingest_post(post, &mut staged, &mut summary)?;

        for (rom, table) in &staged.tables {
            self.store.put_table(rom, table)?;
        }

        let mut games = self.store.get_games_index()?.unwrap_or_default();
        let known: HashSet<String> = games.iter().cloned().collect();
        games.extend(
            summary
                .games
                .iter()
                .filter(|rom| !known.contains(rom.as_str()))
                .cloned(),
        );
        self.store.put_games_index(&games)?;
        summary.tables_written = staged.tables.len();

        info!(
            round = %post.round,
            tables = summary.tables_written,
            skipped = summary.skipped.len(),
            "Round merged"
        );
        Ok(summary)
    }

    fn ingest_post(
        &self,
        post: &TournamentPost,
        contents: &mut StoreContents,
        summary: &mut RefreshSummary,
    ) -> Result<()> {
        let roms = self.extractor.extract_rom_names(&post.content_html);
        debug!(round = %post.round, roms = ?roms, "ROMs in round");
        summary.games.extend(roms.iter().cloned());

        for rom in &roms {
            match self.extractor.extract_result_table(&post.content_html, rom) {
                Ok(Some(table)) => contents.put_table(rom, table),
                Ok(None) => {
                    warn!(round = %post.round, rom = %rom, "No table found, skipping");
                    summary.skipped.push(rom.clone());
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    warn!(round = %post.round, rom = %rom, "Skipping: {e}");
                    summary.skipped.push(rom.clone());
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }
}

fn log_duplicates(games: &[String]) {
    let mut seen = HashSet::new();
    for game in games {
        if !seen.insert(game.as_str()) {
            debug!(rom = %game, "ROM listed more than once in games index");
        }
    }
}
