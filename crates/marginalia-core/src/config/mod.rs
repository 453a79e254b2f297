//! Configuration for marginalia
//!
//! Settings come from a TOML or JSON file found by walking up from the
//! working directory:
//! - `.marginaliarc.toml`
//! - `.marginaliarc.json`
//! - `marginalia.toml`
//!
//! ## Example
//!
//! ```toml
//! [classifier]
//! enabled = true
//! families = ["openmp", "openacc", "include"]
//!
//! [printer]
//! indentSize = 4
//! eolPadding = 2
//! ```

mod loader;
mod settings;

pub use loader::{CONFIG_FILE_NAMES, ConfigLoader};
pub use settings::{
    ClassifierConfiguration, DEFAULT_EOL_PADDING, DEFAULT_INDENT_SIZE, MarginaliaConfig,
    PrinterConfiguration,
};
