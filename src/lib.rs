// Library root
// ------------
// The binary (`main.rs`) only parses flags, sets up logging and hands over
// to `app::execute`. Everything else lives here so it can be tested
// without a terminal or a network.
//
// Module responsibilities:
// - `template`: `{name}` placeholder substitution.
// - `options`: the merged bag of post settings and its defaults.
// - `config`: loading and saving the per-user defaults file.
// - `api`: the HTTP seam (`Transport`) and the blocking reqwest client.
// - `soundcloud`: resolving a permalink into a title and embed code.
// - `publisher`: the Tumblr and Posterous variants and the registry.
// - `app`: validation, persistence and reporting for one invocation.
pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod options;
pub mod publisher;
pub mod soundcloud;
pub mod template;

pub use error::{Result, SoundlrousError};
pub use options::PostOptions;
