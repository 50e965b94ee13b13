use super::dom::Element;
use crate::domain::{ResultRow, ResultTable};
use crate::error::{ArcadeError, Result};

const SCORE_HEADERS: &[&str] = &["score", "skóre"];
const PLAYER_HEADERS: &[&str] = &["player", "hráč", "jméno", "name", "nick", "nickname"];
const RANK_HEADERS: &[&str] = &["#", "pořadí", "rank", "pos", "position", "místo"];
// Rendered link text/icons, replaced by the structured media fields.
const MEDIA_HEADERS: &[&str] = &["screenshot", "inp"];

fn header_in(header: &str, names: &[&str]) -> bool {
    let header = header.trim().to_lowercase();
    names.iter().any(|name| *name == header)
}

/// Strips every non-digit character and parses what is left.
pub fn parse_score(raw: &str) -> Result<u64> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(ArcadeError::Format(format!("score {raw:?} has no digits")));
    }
    digits
        .parse::<u64>()
        .map_err(|e| ArcadeError::Format(format!("score {raw:?}: {e}")))
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RowMedia {
    pub avatar_url: Option<String>,
    pub input_url: Option<String>,
    pub screenshot_url: Option<String>,
}

/// Media links of a single row, taken in document order. Lookup is scoped to
/// the row so a missing link never shifts values between rows.
pub fn row_media(row: &Element) -> RowMedia {
    let mut media = RowMedia::default();

    for el in row.descendants() {
        match el.name.as_str() {
            "img" if media.avatar_url.is_none() && el.has_class("avatar") => {
                media.avatar_url = el.attr("src").map(str::to_string);
            }
            "a" => {
                let Some(href) = el.attr("href") else {
                    continue;
                };
                let lower = href.to_lowercase();
                if media.input_url.is_none() && lower.ends_with(".zip") {
                    media.input_url = Some(href.to_string());
                } else if media.screenshot_url.is_none() && lower.ends_with(".png") {
                    media.screenshot_url = Some(href.to_string());
                }
            }
            _ => {}
        }
    }

    media
}

fn cells(row: &Element) -> Vec<&Element> {
    row.child_elements()
        .filter(|el| el.name == "td" || el.name == "th")
        .collect()
}

struct Layout {
    score: usize,
    player: usize,
    extra: Vec<usize>,
}

impl Layout {
    fn from_headers(headers: &[String]) -> Result<Self> {
        let score = headers
            .iter()
            .position(|h| header_in(h, SCORE_HEADERS))
            .ok_or_else(|| ArcadeError::Format(format!("no Score column in {headers:?}")))?;

        let player = headers
            .iter()
            .position(|h| header_in(h, PLAYER_HEADERS))
            .or_else(|| {
                headers.iter().enumerate().position(|(idx, h)| {
                    idx != score && !header_in(h, MEDIA_HEADERS) && !header_in(h, RANK_HEADERS)
                })
            })
            .ok_or_else(|| ArcadeError::Format(format!("no player column in {headers:?}")))?;

        let extra = (0..headers.len())
            .filter(|&idx| idx != score && idx != player && !header_in(&headers[idx], MEDIA_HEADERS))
            .collect();

        Ok(Self {
            score,
            player,
            extra,
        })
    }
}

/// Converts a result `table` into typed rows.
///
/// The first `tr` holds the column names; every later `tr` with at least one
/// cell is a record.
pub fn parse_result_table(rom: &str, table: &Element) -> Result<ResultTable> {
    let rows = table.find_all("tr");
    let (header_row, records) = rows
        .split_first()
        .ok_or_else(|| ArcadeError::Format(format!("result table for {rom} has no rows")))?;

    let headers: Vec<String> = cells(header_row)
        .into_iter()
        .map(Element::normalized_text)
        .collect();
    let layout = Layout::from_headers(&headers)?;

    let mut result = ResultTable::new(
        rom,
        layout.extra.iter().map(|&idx| headers[idx].clone()).collect(),
    );

    for row in records {
        let texts: Vec<String> = cells(row).into_iter().map(Element::normalized_text).collect();
        if texts.is_empty() {
            continue;
        }
        let cell = |idx: usize| texts.get(idx).cloned().unwrap_or_default();

        let media = row_media(row);
        result.rows.push(ResultRow {
            player_name: cell(layout.player),
            score: parse_score(&cell(layout.score))?,
            avatar_url: media.avatar_url,
            input_url: media.input_url,
            screenshot_url: media.screenshot_url,
            extra: layout.extra.iter().map(|&idx| cell(idx)).collect(),
        });
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::infrastructure::extract::dom::Document;

    fn first_table(html: &str) -> ResultTable {
        let doc = Document::parse_fragment(html);
        let table = doc.find_all("table")[0];
        parse_result_table("pacman", table).unwrap()
    }

    #[test]
    fn score_strips_everything_but_digits() {
        assert_eq!(parse_score("1,234 pts").unwrap(), 1234);
        assert_eq!(parse_score(" 98 760 ").unwrap(), 98760);
    }

    #[test]
    fn score_without_digits_is_a_format_error() {
        let err = parse_score("pts").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn score_overflow_is_a_format_error() {
        let err = parse_score("99999999999999999999999").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn media_columns_are_row_scoped() {
        let table = first_table(
            r#"<table>
            <tr><th>#</th><th>Hráč</th><th>Score</th><th>Screenshot</th><th>INP</th></tr>
            <tr><td>1</td><td><img class="avatar avatar-32" src="a1.jpg">alice</td><td>3,000</td>
                <td><a href="https://x/s1.PNG">img</a></td><td><a href="https://x/i1.zip">zip</a></td></tr>
            <tr><td>2</td><td><img class="avatar avatar-32" src="a2.jpg">bob</td><td>2,000</td>
                <td></td><td><a href="https://x/i2.zip">zip</a></td></tr>
            <tr><td>3</td><td><img class="avatar avatar-32" src="a3.jpg">carol</td><td>1,000</td>
                <td><a href="https://x/s3.png">img</a></td><td><a href="https://x/i3.ZIP">zip</a></td></tr>
            </table>"#,
        );

        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0].screenshot_url.as_deref(), Some("https://x/s1.PNG"));
        assert_eq!(table.rows[1].screenshot_url, None);
        assert_eq!(table.rows[2].screenshot_url.as_deref(), Some("https://x/s3.png"));

        assert_eq!(table.rows[1].input_url.as_deref(), Some("https://x/i2.zip"));
        assert_eq!(table.rows[2].input_url.as_deref(), Some("https://x/i3.ZIP"));
        assert_eq!(table.rows[1].avatar_url.as_deref(), Some("a2.jpg"));
    }

    #[test]
    fn literal_media_columns_are_dropped_and_others_pass_through() {
        let table = first_table(
            r#"<table>
            <tr><th>#</th><th>Player</th><th>Score</th><th>Date</th><th>Screenshot</th><th>INP</th></tr>
            <tr><td>1</td><td>alice</td><td>12 340</td><td>1.2.2025</td><td>📷</td><td>⬇</td></tr>
            </table>"#,
        );

        assert_eq!(table.extra_columns, vec!["#", "Date"]);
        let row = &table.rows[0];
        assert_eq!(row.player_name, "alice");
        assert_eq!(row.score, 12340);
        assert_eq!(row.extra, vec!["1", "1.2.2025"]);
    }

    #[test]
    fn player_column_falls_back_to_first_plain_column() {
        let table = first_table(
            "<table><tr><td>Pořadí</td><td>Nick</td><td>Score</td></tr>\
             <tr><td>1</td><td>dave</td><td>10</td></tr></table>",
        );
        assert_eq!(table.rows[0].player_name, "dave");

        let table = first_table(
            "<table><tr><td>#</td><td>Who</td><td>Score</td></tr>\
             <tr><td>1</td><td>erin</td><td>10</td></tr></table>",
        );
        assert_eq!(table.rows[0].player_name, "erin");
        assert_eq!(table.extra_columns, vec!["#"]);
    }

    #[test]
    fn short_rows_are_padded() {
        let table = first_table(
            "<table><tr><th>Player</th><th>Score</th><th>Note</th></tr>\
             <tr><td>frank</td><td>5</td></tr></table>",
        );
        assert_eq!(table.rows[0].extra, vec![String::new()]);
    }

    #[test]
    fn missing_score_column_is_a_format_error() {
        let doc = Document::parse_fragment(
            "<table><tr><th>Player</th></tr><tr><td>x</td></tr></table>",
        );
        let err = parse_result_table("pacman", doc.find_all("table")[0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn empty_score_cell_is_a_format_error() {
        let doc = Document::parse_fragment(
            "<table><tr><th>Player</th><th>Score</th></tr><tr><td>x</td><td>DNF</td></tr></table>",
        );
        let err = parse_result_table("pacman", doc.find_all("table")[0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }
}
