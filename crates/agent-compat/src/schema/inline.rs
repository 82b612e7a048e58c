//! Inline-only policy

use super::{JsonSchema, SchemaTransformer, WalkContext, WalkOptions};
use crate::error::Result;

/// Removes `$defs` by inlining every reference; nodes are otherwise untouched
///
/// Used for vendors that accept plain JSON Schema but not references.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineDefsTransformer;

impl SchemaTransformer for InlineDefsTransformer {
    fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            prefer_inlined_defs: true,
            simplify_nullable_unions: false,
        }
    }

    fn transform(&self, schema: JsonSchema, _ctx: &mut WalkContext) -> Result<JsonSchema> {
        Ok(schema)
    }
}
