pub mod line_client;
pub mod race_check;
pub mod race_page_fetcher;

pub use line_client::*;
pub use race_check::*;
pub use race_page_fetcher::*;
