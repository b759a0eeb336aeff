//! Chat export parsers.
//!
//! - [`SimpleParser`] - flat JSON transcripts (`.json` uploads)
//! - [`GraphParser`] - branching conversation graphs (the `conversations.json`
//!   member of `.zip` uploads)
//!
//! # Example
//!
//! ```rust
//! use chatvault::parsers::SimpleParser;
//!
//! let raw = br#"[{"role": "user", "content": "Hello"}]"#;
//! let conversation = SimpleParser::new().parse_slice(raw, "chat.json", "chat")?;
//! assert_eq!(conversation.title, "chat");
//! assert_eq!(conversation.messages[0].content, "Hello");
//! # Ok::<(), chatvault::ChatvaultError>(())
//! ```

pub mod graph;
mod simple;

pub use graph::{GraphConversation, GraphNode, GraphParser, ancestor_path};
pub use simple::SimpleParser;
