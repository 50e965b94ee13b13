pub(crate) mod archive;
pub(crate) mod clients;
pub(crate) mod extract;
mod storage;

pub use clients::feed::{FeedClient, DEFAULT_FEED_URL};
pub use extract::{Extractor, TablePolicy};
pub use storage::fs_store::FileSystemStore;
