//! Comment tree assembly.
//!
//! ```text
//! listing children → RawNode → CommentTreeBuilder ⇄ MoreChildrenSource
//!                                     ↓
//!                              ContentExtractor → CommentTree
//! ```

pub mod builder;
pub mod raw;

pub use builder::{CommentTreeBuilder, MoreChildrenSource, MAX_DEPTH};
pub use raw::{MalformedNodeError, MoreStub, RawComment, RawNode, RawThing};
