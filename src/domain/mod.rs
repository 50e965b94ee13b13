mod post;
mod results;
pub(crate) mod storage;

pub use post::{RoundId, TournamentPost};
pub use results::{GamesIndex, ResultRow, ResultTable};
pub use storage::StoreContents;
