//! Comment-to-code association.
//!
//! The engine and driver turn one parsed method plus its cleaned comment
//! list into an entity tree whose nodes carry symmetric association
//! links, ready for tree differencing.

pub mod driver;
pub mod engine;

pub use driver::TraversalDriver;
pub use engine::AssociationEngine;

use crate::config::Settings;
use crate::error::DistillResult;
use crate::parsing::java::parser::node_range;
use crate::parsing::{JavaParser, clean_comments, extract_comments, find_method};
use crate::tree::EntityTree;

/// Parse `code`, extract and clean its comments, and build the
/// associated entity tree for the method named `method_name`.
pub fn associate_method_comments(code: &str, method_name: &str) -> DistillResult<EntityTree> {
    associate_method_comments_with(&Settings::default(), code, method_name)
}

/// Same as [`associate_method_comments`], with explicit settings.
///
/// Only comments lying within the method's own range take part in the
/// association; the rest of the unit's comments belong to other scopes.
pub fn associate_method_comments_with(
    settings: &Settings,
    code: &str,
    method_name: &str,
) -> DistillResult<EntityTree> {
    let mut parser = JavaParser::new()?;
    let parsed = parser.parse(code)?;
    let method = find_method(&parsed, code, method_name)?;

    let raw = extract_comments(&parsed, code);
    let mut comments = if settings.association.merge_adjacent_line_comments {
        clean_comments(code, raw)
    } else {
        raw
    };
    let scope = node_range(method);
    comments.retain(|c| scope.contains(c.range));

    TraversalDriver::new(code)
        .with_max_depth(settings.association.max_nesting_depth)
        .convert_method(method, comments)
}
