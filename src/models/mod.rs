mod candle;
mod granularity;
mod window;

pub use candle::{Candle, CandleDataset};
pub use granularity::Granularity;
pub use window::FetchWindow;
