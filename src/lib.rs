pub mod association;
pub mod comment;
pub mod config;
pub mod error;
pub mod logging;
pub mod parsing;
pub mod tree;
pub mod types;

pub use association::{
    AssociationEngine, TraversalDriver, associate_method_comments, associate_method_comments_with,
};
pub use comment::{Comment, CommentKind};
pub use config::Settings;
pub use error::{DistillError, DistillResult};
pub use parsing::JavaParser;
pub use tree::{EntityNode, EntityTree};
pub use types::{CompactString, EntityKind, NodeId, SourceRange};
