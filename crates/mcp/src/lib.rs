//! MCP server surface for the Stacksmith scaffolding engine.
//!
//! One typed tool per registered operation; the engine's dispatch does the
//! actual work and every result crosses the boundary as a single text
//! payload plus an error flag.

mod server;
mod stats;

pub use server::{McpServices, StacksmithMcpCore, serve_stdio};
pub use stats::SessionStats;
