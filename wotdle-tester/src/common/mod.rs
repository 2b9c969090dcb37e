pub mod reporter;
pub mod scenario;
pub mod storage;
pub mod util;

pub use reporter::{OfflineReporter, StaticReporter};
pub use storage::FileStorage;
pub use util::{parse_ids, parse_instant, split_csv};
