pub mod comment;
pub mod post;

pub use comment::{Comment, CommentTree, Link, LinkId};
pub use post::Post;
