//! lassist: core of a local coding assistant.
//!
//! Prompts (chat text, "generate code" instructions, "explain this
//! selection") are turned into one request against a locally hosted
//! model server and the answer is routed back to a chat surface or
//! returned for insertion.
//!
//! ```text
//! lassist/
//! ├── src/
//! │   ├── lib.rs          # Re-exports
//! │   ├── error.rs        # Query and input error types
//! │   ├── config.rs       # Endpoint configuration and its sources
//! │   ├── request.rs      # Generate call and display protocol types
//! │   ├── prompt.rs       # Language names and prompt templates
//! │   ├── extract.rs      # Fenced code block extraction
//! │   ├── providers/      # Model backends (Ollama-style /api/generate)
//! │   ├── relay.rs        # Per-surface conversation actor
//! │   ├── registry.rs     # One relay per surface
//! │   ├── commands.rs     # open chat / generate / explain entry points
//! │   └── main.rs         # Terminal front-end
//! └── tests/
//! ```

pub mod error;
pub mod config;
pub mod request;
pub mod prompt;
pub mod extract;
pub mod providers;
pub mod relay;
pub mod registry;
pub mod commands;

pub use config::{ConfigSource, Configuration, SettingsFile};
pub use error::{Error, QueryError};
pub use extract::extract_code;
pub use prompt::{build_prompt, resolve_language_name, Intent};
pub use providers::{ModelClient, OllamaClient};
pub use relay::{RelayState, Surface, SurfaceHandle};
pub use registry::{SurfaceId, SurfaceRegistry};
pub use request::{ChatMessage, DisplayMessage, Role, UiMessage};
