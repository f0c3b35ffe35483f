pub mod config;
pub mod errors;
pub mod filters;
pub mod metrics;
pub mod results;
pub mod search;

pub use config::{SearchConfig, SizeLimits};
pub use errors::{Result, SearchError};
pub use results::{ProgressEvent, ProgressKind, SearchResult};
pub use search::{
    Callbacks, CancellationToken, SearchEngine, SearchEvent, SearchListener, SessionOutcome,
};
