//! Output generation: the tabular export and the human-readable run log.
//!
//! # Submodules
//!
//! - [`csv`]: Writes collected records to a CSV file
//! - [`console`]: Renders the preview block and sentiment lines
//!
//! # Export Layout
//!
//! ```text
//! export_dir/
//! ├── finviz_financial_news.csv    # headline,fetched_at,url,timestamp
//! └── benzinga_financial_news.csv  # headline,fetched_at
//! ```

pub mod console;
pub mod csv;
