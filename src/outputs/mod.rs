//! Output generation for feed histories.
//!
//! # Submodules
//!
//! - [`csv`]: Writes a feed history to its CSV destination
//!
//! # Output Structure
//!
//! ```text
//! repo_path/
//! ├── .gitignore
//! └── news/
//!     ├── bitcoin_news.csv
//!     ├── ethereum_news.csv
//!     └── solana_news.csv
//! ```

pub mod csv;
