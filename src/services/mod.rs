pub mod history;
pub mod output;
pub use history::{
    next_window, CandleFetchLoop, FetchOutcome, FetchSettings, FetchTarget, Interrupt, Pause,
    Throttle,
};
pub use output::{resolve_output_path, write_dataset, DatasetKey};
