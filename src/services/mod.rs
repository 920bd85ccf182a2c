pub mod dedup;
pub mod downloader;
pub mod extractor;
pub mod persister;
pub mod run_log;
pub mod storage;

pub use dedup::SeenSet;
pub use downloader::{Downloader, ReqwestDownloader};
pub use extractor::{Extractor, PollOutcome};
pub use persister::Persister;
pub use run_log::RunLog;
pub use storage::{FsStorage, Storage};
