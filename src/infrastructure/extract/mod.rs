pub(crate) mod dom;
pub(crate) mod table;

use crate::domain::ResultTable;
use crate::error::{ArcadeError, Result};
use clap::ValueEnum;
use dom::Document;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

static ROM_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"ROM:\s*([a-zA-Z0-9_]+)").unwrap());

/// Which table wins when several tables in one post sit under a heading
/// naming the same ROM.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TablePolicy {
    #[default]
    FirstMatch,
    LastMatch,
    /// Several candidates are an error.
    Strict,
}

#[derive(Debug, Clone, Default)]
pub struct Extractor {
    policy: TablePolicy,
}

impl Extractor {
    pub fn new(policy: TablePolicy) -> Self {
        Self { policy }
    }

    /// ROM names from `h3` headings in document order, duplicates included.
    pub fn extract_rom_names(&self, content_html: &str) -> Vec<String> {
        let document = Document::parse_fragment(content_html);

        document
            .find_all("h3")
            .into_iter()
            .filter_map(|h3| {
                let text = h3.stripped_text();
                ROM_REGEX
                    .captures(&text)
                    .and_then(|caps| caps.get(1))
                    .map(|name| name.as_str().to_string())
            })
            .collect()
    }

    /// Scrapes the result table whose nearest heading mentions `rom`.
    ///
    /// Returns `Ok(None)` when no table qualifies.
    pub fn extract_result_table(&self, content_html: &str, rom: &str) -> Result<Option<ResultTable>> {
        let document = Document::parse_fragment(content_html);

        let candidates: Vec<_> = document
            .tables_with_headings()
            .into_iter()
            .filter_map(|(table, heading)| {
                heading
                    .filter(|h| h.stripped_text().contains(rom))
                    .map(|_| table)
            })
            .collect();

        if candidates.len() > 1 {
            warn!(
                rom,
                candidates = candidates.len(),
                policy = ?self.policy,
                "several result tables match"
            );
        }

        let target = match self.policy {
            TablePolicy::FirstMatch => candidates.first(),
            TablePolicy::LastMatch => candidates.last(),
            TablePolicy::Strict if candidates.len() > 1 => {
                return Err(ArcadeError::AmbiguousTable {
                    rom: rom.to_string(),
                    candidates: candidates.len(),
                });
            }
            TablePolicy::Strict => candidates.first(),
        };

        let Some(table) = target else {
            debug!(rom, "no result table found");
            return Ok(None);
        };

        table::parse_result_table(rom, table).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const POST: &str = r#"
        <p>Welcome to round 12.</p>
        <h3>ROM: pacman</h3>
        <figure class="wp-block-table"><table>
            <thead><tr><th>#</th><th>Hráč</th><th>Score</th><th>Screenshot</th><th>INP</th></tr></thead>
            <tbody>
            <tr><td>1</td><td><img class="avatar avatar-32 photo wpat-avatar" src="https://x/a.jpg"> alice</td>
                <td>1,234 pts</td><td><a href="https://x/p1.png">📷</a></td><td><a href="https://x/p1.zip">⬇</a></td></tr>
            </tbody>
        </table></figure>
        <h3>ROM: galaga_2</h3>
        <table>
            <tr><th>Hráč</th><th>Score</th></tr>
            <tr><td>bob</td><td>50 000</td></tr>
        </table>
        <h3>Scores</h3>
        <p>That's all.</p>
    "#;

    #[test]
    fn rom_names_follow_document_order() {
        let extractor = Extractor::default();
        assert_eq!(extractor.extract_rom_names(POST), vec!["pacman", "galaga_2"]);
    }

    #[test]
    fn duplicate_rom_headings_are_kept() {
        let html = "<h3>ROM: dkong</h3><h2>ROM: ignored</h2><h3> ROM:dkong </h3>";
        let extractor = Extractor::default();
        assert_eq!(extractor.extract_rom_names(html), vec!["dkong", "dkong"]);
    }

    #[test]
    fn table_is_located_under_its_heading() {
        let extractor = Extractor::default();

        let pacman = extractor.extract_result_table(POST, "pacman").unwrap().unwrap();
        assert_eq!(pacman.rows.len(), 1);
        assert_eq!(pacman.rows[0].player_name, "alice");
        assert_eq!(pacman.rows[0].score, 1234);
        assert_eq!(pacman.rows[0].avatar_url.as_deref(), Some("https://x/a.jpg"));

        let galaga = extractor.extract_result_table(POST, "galaga_2").unwrap().unwrap();
        assert_eq!(galaga.rows[0].player_name, "bob");
        assert_eq!(galaga.rows[0].score, 50000);
    }

    #[test]
    fn unknown_rom_yields_none() {
        let extractor = Extractor::default();
        assert!(extractor.extract_result_table(POST, "mspacman").unwrap().is_none());
    }

    const TWICE: &str = r#"
        <h3>ROM: tetris</h3>
        <table><tr><th>Player</th><th>Score</th></tr><tr><td>first</td><td>1</td></tr></table>
        <h3>ROM: tetris (bonus)</h3>
        <table><tr><th>Player</th><th>Score</th></tr><tr><td>second</td><td>2</td></tr></table>
    "#;

    #[test]
    fn policy_decides_between_candidates() {
        let first = Extractor::new(TablePolicy::FirstMatch)
            .extract_result_table(TWICE, "tetris")
            .unwrap()
            .unwrap();
        assert_eq!(first.rows[0].player_name, "first");

        let last = Extractor::new(TablePolicy::LastMatch)
            .extract_result_table(TWICE, "tetris")
            .unwrap()
            .unwrap();
        assert_eq!(last.rows[0].player_name, "second");

        let err = Extractor::new(TablePolicy::Strict)
            .extract_result_table(TWICE, "tetris")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }
}
