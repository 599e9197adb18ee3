//! suitekit artifact layer
//!
//! The boundary between a test project on disk and the loader's in-memory
//! values. Nothing in this crate knows what a testcase is.
//!
//! # Core Operations
//!
//! - **Read**: parse JSON, YAML and CSV files into `serde_json::Value`
//! - **Scan**: enumerate artifact files under one or more folders
//! - **Locate**: find the project anchor file by walking parent directories
//! - **Environment**: parse `.env` files and optionally export them
//!
//! # Example
//!
//! ```rust,ignore
//! use suitekit_artifact::{load_file, load_folder_files, locate_file};
//!
//! let anchor = locate_file("tests/smoke/login.yml", "suitekit.toml")?;
//! for path in load_folder_files("tests", true)? {
//!     let raw = load_file(&path)?;
//!     println!("{}: {}", path.display(), raw.content);
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod dotenv;
pub mod error;
pub mod locate;
pub mod parsers;
pub mod reader;
pub mod scan;

pub use dotenv::{load_dot_env_file, parse_dot_env};
pub use error::{ArtifactError, ArtifactResult};
pub use locate::{locate_file, AnchorLocator};
pub use parsers::{ArtifactFormat, ArtifactParser, ParserRegistry};
pub use reader::{check_format, load_file, ArtifactReader, RawArtifact};
pub use scan::{load_folder_files, load_folders_files};
