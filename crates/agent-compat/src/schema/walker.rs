//! Recursive schema walker
//!
//! The walker owns the traversal: reference resolution, recursion into object,
//! array and union substructures, cycle detection and reassembly of the final
//! document. Policies only see one node at a time through
//! [`SchemaTransformer::transform`].
//!
//! All mutable state of a walk lives in a [`WalkContext`] created per call, so
//! a policy value can be shared freely between threads and reused.

use super::{DEFS_KEY, JsonSchema, REF_KEY, SchemaDocument, def_key, def_ref, definition};
use crate::error::{CompatError, Result};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::mem;
use tracing::{debug, warn};

/// Default bound on schema nesting depth
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Walk configuration a policy asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WalkOptions {
    /// Replace references with the definitions they point at
    pub prefer_inlined_defs: bool,
    /// Collapse `anyOf: [X, {type: null}]` into `X` plus `nullable: true`
    pub simplify_nullable_unions: bool,
}

/// A vendor policy applied by the [`Walker`]
///
/// `transform` is called once per node, children first, after references have
/// been resolved and unions simplified.
#[cfg_attr(test, mockall::automock)]
pub trait SchemaTransformer {
    /// Walk configuration for this policy
    fn walk_options(&self) -> WalkOptions {
        WalkOptions::default()
    }

    /// Rewrite a single node
    fn transform(&self, schema: JsonSchema, ctx: &mut WalkContext) -> Result<JsonSchema>;

    /// Fix up the assembled document once the walk is complete
    fn finish(&self, schema: JsonSchema, _ctx: &WalkContext) -> Result<JsonSchema> {
        Ok(schema)
    }
}

/// Per-walk state, threaded through every `transform` call
#[derive(Debug, Clone)]
pub struct WalkContext {
    strict: Option<bool>,
    defs: JsonSchema,
    root_ref: Option<String>,
    refs_stack: Vec<String>,
    recursive_refs: BTreeSet<String>,
    is_strict_compatible: bool,
    warnings: Vec<String>,
    depth: usize,
    max_depth: usize,
}

impl WalkContext {
    /// Context for a document without definitions
    pub fn new(strict: Option<bool>) -> Self {
        Self::for_document(strict, JsonSchema::new(), None, DEFAULT_MAX_DEPTH)
    }

    fn for_document(
        strict: Option<bool>,
        defs: JsonSchema,
        root_ref: Option<String>,
        max_depth: usize,
    ) -> Self {
        Self {
            strict,
            defs,
            root_ref,
            refs_stack: Vec::new(),
            recursive_refs: BTreeSet::new(),
            is_strict_compatible: true,
            warnings: Vec::new(),
            depth: 0,
            max_depth,
        }
    }

    /// Strict mode: forced on, forced off, or `None` to auto-detect
    pub fn strict(&self) -> Option<bool> {
        self.strict
    }

    /// `$ref` of the document root, if the whole schema is one reference
    pub fn root_ref(&self) -> Option<&str> {
        self.root_ref.as_deref()
    }

    /// Whether every node seen so far already satisfied strict mode
    pub fn is_strict_compatible(&self) -> bool {
        self.is_strict_compatible
    }

    /// Record that the schema is not strict-compatible as given
    ///
    /// Monotonic: there is no way back to compatible within a walk.
    pub fn mark_strict_incompatible(&mut self) {
        self.is_strict_compatible = false;
    }

    /// Definition names found to be part of a reference cycle
    pub fn recursive_refs(&self) -> &BTreeSet<String> {
        &self.recursive_refs
    }

    /// Report a non-fatal, lossy rewrite
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        if self.warnings.contains(&message) {
            return;
        }
        warn!("{}", message);
        self.warnings.push(message);
    }

    /// Warnings reported so far
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

/// Output of a walk
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    /// The rewritten schema
    pub schema: JsonSchema,
    /// Whether the input already met strict mode (meaningful in auto-detect mode)
    pub is_strict_compatible: bool,
    /// Non-fatal warnings about lossy rewrites
    pub warnings: Vec<String>,
}

impl Transformed {
    /// The rewritten schema as a JSON value
    pub fn into_value(self) -> Value {
        Value::Object(self.schema)
    }
}

/// Configured walk over a schema with one policy
///
/// # Example
///
/// ```
/// use agent_compat::schema::{OpenAiTransformer, Walker};
/// use serde_json::json;
///
/// let schema = json!({"type": "object", "properties": {"a": {"type": "string"}}});
/// let transformed = Walker::new(&OpenAiTransformer)
///     .strict(Some(true))
///     .max_depth(32)
///     .walk(schema.as_object().unwrap())?;
///
/// assert_eq!(transformed.schema["required"], json!(["a"]));
/// # Ok::<(), agent_compat::CompatError>(())
/// ```
pub struct Walker<'t, T: ?Sized> {
    transformer: &'t T,
    strict: Option<bool>,
    max_depth: usize,
}

impl<'t, T: SchemaTransformer + ?Sized> Walker<'t, T> {
    /// Create a walker in auto-detect strict mode with the default depth bound
    pub fn new(transformer: &'t T) -> Self {
        Self {
            transformer,
            strict: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set strict mode
    pub fn strict(mut self, strict: Option<bool>) -> Self {
        self.strict = strict;
        self
    }

    /// Set the nesting bound
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Transform `schema`, leaving the input untouched
    pub fn walk(&self, schema: &JsonSchema) -> Result<Transformed> {
        let options = self.transformer.walk_options();
        let SchemaDocument { root, defs } = SchemaDocument::from_schema(schema)?;
        let root_ref = root.get(REF_KEY).and_then(Value::as_str).map(str::to_owned);

        debug!(
            definitions = defs.len(),
            strict = ?self.strict,
            inline = options.prefer_inlined_defs,
            "Walking schema"
        );

        let mut pass = Pass {
            transformer: self.transformer,
            options,
            ctx: WalkContext::for_document(self.strict, defs, root_ref, self.max_depth),
        };

        let handled = pass.handle(root)?;
        let assembled = if !options.prefer_inlined_defs {
            pass.attach_defs(handled)?
        } else if pass.ctx.recursive_refs.is_empty() {
            handled
        } else {
            pass.recursive_document(handled, schema)?
        };
        if options.prefer_inlined_defs {
            check_references(&assembled)?;
        }

        let schema = self.transformer.finish(assembled, &pass.ctx)?;
        let WalkContext {
            is_strict_compatible,
            warnings,
            recursive_refs,
            ..
        } = pass.ctx;

        debug!(
            is_strict_compatible,
            warnings = warnings.len(),
            recursive = recursive_refs.len(),
            "Schema walk complete"
        );

        Ok(Transformed {
            schema,
            is_strict_compatible,
            warnings,
        })
    }
}

/// Walk `schema` with `transformer` using the default depth bound
pub fn walk<T: SchemaTransformer + ?Sized>(
    schema: &JsonSchema,
    transformer: &T,
    strict: Option<bool>,
) -> Result<Transformed> {
    Walker::new(transformer).strict(strict).walk(schema)
}

/// Structural dispatch on the `type` keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchemaKind {
    Object,
    Array,
    /// No `type`: `anyOf` / `oneOf` members are the substructure
    Union,
    Other,
}

impl SchemaKind {
    fn of(schema: &JsonSchema) -> Self {
        match schema.get("type") {
            None => Self::Union,
            Some(Value::String(t)) if t == "object" => Self::Object,
            Some(Value::String(t)) if t == "array" => Self::Array,
            Some(_) => Self::Other,
        }
    }
}

struct Pass<'t, T: ?Sized> {
    transformer: &'t T,
    options: WalkOptions,
    ctx: WalkContext,
}

impl<T: SchemaTransformer + ?Sized> Pass<'_, T> {
    fn handle(&mut self, schema: JsonSchema) -> Result<JsonSchema> {
        if self.ctx.depth >= self.ctx.max_depth {
            return Err(CompatError::DepthExceeded(self.ctx.max_depth));
        }
        self.ctx.depth += 1;

        let (schema, pushed) = self.resolve(schema)?;
        let schema = match SchemaKind::of(&schema) {
            SchemaKind::Object => self.handle_object(schema)?,
            SchemaKind::Array => self.handle_array(schema)?,
            SchemaKind::Union => self.handle_unions(schema)?,
            SchemaKind::Other => schema,
        };
        let schema = self.transformer.transform(schema, &mut self.ctx)?;

        // siblings must not see this branch's references
        let len = self.ctx.refs_stack.len();
        self.ctx.refs_stack.truncate(len - pushed);
        self.ctx.depth -= 1;

        Ok(schema)
    }

    /// Follow a chain of `$ref`s, stopping at a cycle.
    ///
    /// Returns the resolved node and how many names were pushed.
    fn resolve(&mut self, mut schema: JsonSchema) -> Result<(JsonSchema, usize)> {
        if !self.options.prefer_inlined_defs {
            return Ok((schema, 0));
        }

        let mut pushed = 0;
        while let Some(reference) = schema.get(REF_KEY).and_then(Value::as_str) {
            let key = def_key(reference).to_owned();
            if self.ctx.refs_stack.contains(&key) {
                debug!(definition = %key, "Recursive reference kept");
                self.ctx.recursive_refs.insert(key);
                break;
            }

            let Some(resolved) = definition(&self.ctx.defs, &key)?.cloned() else {
                return Err(CompatError::UnresolvableReference(key));
            };
            self.ctx.refs_stack.push(key);
            pushed += 1;
            schema = resolved;
        }

        Ok((schema, pushed))
    }

    fn handle_object(&mut self, mut schema: JsonSchema) -> Result<JsonSchema> {
        if let Some(Value::Object(properties)) = schema.get_mut("properties") {
            self.handle_entries(properties)?;
        }
        // boolean additionalProperties is a flag, not a schema
        if let Some(additional) = schema.get_mut("additionalProperties") {
            self.handle_value(additional)?;
        }
        if let Some(Value::Object(patterns)) = schema.get_mut("patternProperties") {
            self.handle_entries(patterns)?;
        }
        Ok(schema)
    }

    fn handle_array(&mut self, mut schema: JsonSchema) -> Result<JsonSchema> {
        if let Some(Value::Array(prefix_items)) = schema.get_mut("prefixItems") {
            for item in prefix_items {
                self.handle_value(item)?;
            }
        }
        if let Some(items) = schema.get_mut("items") {
            self.handle_value(items)?;
        }
        Ok(schema)
    }

    fn handle_unions(&mut self, schema: JsonSchema) -> Result<JsonSchema> {
        let (schema, collapsed) = self.handle_union(schema, "anyOf")?;
        if collapsed {
            // the surviving member was handled in full already
            return Ok(schema);
        }
        let (schema, _) = self.handle_union(schema, "oneOf")?;
        Ok(schema)
    }

    /// Handle the members of one union keyword.
    ///
    /// The flag is true when the union collapsed to its single member.
    fn handle_union(&mut self, mut schema: JsonSchema, kind: &str) -> Result<(JsonSchema, bool)> {
        let mut members = match schema.get_mut(kind) {
            Some(Value::Array(members)) if !members.is_empty() => mem::take(members),
            _ => return Ok((schema, false)),
        };

        for member in &mut members {
            self.handle_value(member)?;
        }
        if self.options.simplify_nullable_unions {
            members = simplify_nullable_union(members);
        }

        if members.len() == 1 && members[0].is_object() {
            if let Some(Value::Object(only)) = members.pop() {
                return Ok((only, true));
            }
        }

        schema.insert(kind.to_string(), Value::Array(members));
        Ok((schema, false))
    }

    fn handle_entries(&mut self, entries: &mut JsonSchema) -> Result<()> {
        for value in entries.values_mut() {
            self.handle_value(value)?;
        }
        Ok(())
    }

    /// Handle a child in place; non-object schemas (`true`, `false`) pass through.
    fn handle_value(&mut self, value: &mut Value) -> Result<()> {
        if let Value::Object(node) = value {
            let handled = self.handle(mem::take(node))?;
            *node = handled;
        }
        Ok(())
    }

    fn attach_defs(&mut self, mut handled: JsonSchema) -> Result<JsonSchema> {
        if self.ctx.defs.is_empty() {
            return Ok(handled);
        }

        let mut defs = self.ctx.defs.clone();
        self.handle_entries(&mut defs)?;
        handled.insert(DEFS_KEY.to_string(), Value::Object(defs));
        Ok(handled)
    }

    /// Inlining could not remove every reference: emit the recursive
    /// definitions under `$defs` and point the root at its own entry.
    fn recursive_document(&mut self, handled: JsonSchema, source: &JsonSchema) -> Result<JsonSchema> {
        let mut done = JsonSchema::new();
        let mut pending: Vec<String> = self.ctx.recursive_refs.iter().cloned().collect();

        while let Some(name) = pending.pop() {
            if done.contains_key(&name) {
                continue;
            }
            let Some(def) = definition(&self.ctx.defs, &name)?.cloned() else {
                return Err(CompatError::UnresolvableReference(name));
            };

            // handled with itself on the stack so self references stay references
            self.ctx.refs_stack.push(name.clone());
            let def = self.handle(def)?;
            self.ctx.refs_stack.pop();
            done.insert(name, Value::Object(def));

            // handling may have uncovered further cycles
            for found in &self.ctx.recursive_refs {
                if !done.contains_key(found) && !pending.contains(found) {
                    pending.push(found.clone());
                }
            }
        }

        // keep the source's definition order
        let mut defs = JsonSchema::new();
        for name in self.ctx.defs.keys() {
            if let Some(def) = done.shift_remove(name) {
                defs.insert(name.clone(), def);
            }
        }

        let root_key = match source.get(REF_KEY).and_then(Value::as_str) {
            Some(reference) => def_key(reference).to_owned(),
            None => {
                let mut key = source
                    .get("title")
                    .and_then(Value::as_str)
                    .unwrap_or("root")
                    .to_owned();
                while defs.contains_key(&key) {
                    key.push_str("_root");
                }
                key
            }
        };

        debug!(root = %root_key, definitions = defs.len(), "Emitting recursive definitions");
        defs.insert(root_key.clone(), Value::Object(handled));

        let mut document = JsonSchema::new();
        document.insert(DEFS_KEY.to_string(), Value::Object(defs));
        document.insert(REF_KEY.to_string(), Value::String(def_ref(&root_key)));
        Ok(document)
    }
}

/// Keywords whose values are instances rather than schemas
const DATA_KEYWORDS: &[&str] = &["const", "enum", "default", "examples"];

/// Fail on a `$ref` the walk left pointing outside the emitted `$defs`.
///
/// Only `properties`, `additionalProperties`, `patternProperties`, `items`,
/// `prefixItems`, `anyOf` and `oneOf` are visited, so references under
/// `allOf`, `not` or a multi-type node survive inlining untouched.
fn check_references(document: &JsonSchema) -> Result<()> {
    let defs = match document.get(DEFS_KEY) {
        Some(Value::Object(defs)) => Some(defs),
        _ => None,
    };

    let mut pending: Vec<&Value> = subschemas(document).collect();
    while let Some(value) = pending.pop() {
        match value {
            Value::Object(node) => {
                if let Some(reference) = node.get(REF_KEY).and_then(Value::as_str) {
                    let key = def_key(reference);
                    if !defs.is_some_and(|defs| defs.contains_key(key)) {
                        return Err(CompatError::UnsupportedFeature(format!(
                            "`$ref` to `{key}` is in a position where definitions are not inlined"
                        )));
                    }
                }
                pending.extend(subschemas(node));
            }
            Value::Array(items) => pending.extend(items),
            _ => {}
        }
    }
    Ok(())
}

fn subschemas(node: &JsonSchema) -> impl Iterator<Item = &Value> {
    node.iter()
        .filter(|(key, _)| !DATA_KEYWORDS.contains(&key.as_str()))
        .map(|(_, value)| value)
}

/// `[X, {type: null}]` in either order becomes `[X + nullable: true]`
fn simplify_nullable_union(members: Vec<Value>) -> Vec<Value> {
    let null = json!({"type": "null"});
    if members.len() != 2 || !members.contains(&null) {
        return members;
    }

    match members.iter().find(|member| **member != null) {
        Some(Value::Object(non_null)) => {
            let mut nullable = non_null.clone();
            nullable.insert("nullable".to_string(), Value::Bool(true));
            vec![Value::Object(nullable)]
        }
        // both branches are null
        None => vec![null],
        Some(_) => members,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(value: Value) -> JsonSchema {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    /// Marks every visited node so the traversal is observable
    struct Marker {
        options: WalkOptions,
    }

    impl SchemaTransformer for Marker {
        fn walk_options(&self) -> WalkOptions {
            self.options
        }

        fn transform(&self, mut schema: JsonSchema, _ctx: &mut WalkContext) -> Result<JsonSchema> {
            schema.insert("seen".to_string(), Value::Bool(true));
            Ok(schema)
        }
    }

    struct Identity {
        options: WalkOptions,
    }

    impl SchemaTransformer for Identity {
        fn walk_options(&self) -> WalkOptions {
            self.options
        }

        fn transform(&self, schema: JsonSchema, _ctx: &mut WalkContext) -> Result<JsonSchema> {
            Ok(schema)
        }
    }

    fn inline() -> WalkOptions {
        WalkOptions {
            prefer_inlined_defs: true,
            simplify_nullable_unions: false,
        }
    }

    #[test]
    fn test_visits_every_substructure() {
        let schema = object(json!({
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "tags": {"type": "array", "items": {"type": "string"}},
                "pair": {"type": "array", "prefixItems": [{"type": "integer"}, {"type": "string"}]},
                "extra": {"type": "object", "additionalProperties": {"type": "number"}},
                "flag": {"type": "object", "additionalProperties": false},
                "patterned": {"type": "object", "patternProperties": {"^x-": {"type": "string"}}},
                "either": {"oneOf": [{"type": "integer"}, {"type": "boolean"}]}
            }
        }));

        let marker = Marker {
            options: WalkOptions::default(),
        };
        let result = walk(&schema, &marker, None).unwrap().into_value();

        assert_eq!(result["seen"], true);
        assert_eq!(result["properties"]["name"]["seen"], true);
        assert_eq!(result["properties"]["tags"]["items"]["seen"], true);
        assert_eq!(result["properties"]["pair"]["prefixItems"][1]["seen"], true);
        assert_eq!(result["properties"]["extra"]["additionalProperties"]["seen"], true);
        assert_eq!(result["properties"]["flag"]["additionalProperties"], false);
        assert_eq!(
            result["properties"]["patterned"]["patternProperties"]["^x-"]["seen"],
            true
        );
        assert_eq!(result["properties"]["either"]["oneOf"][0]["seen"], true);
        assert_eq!(result["properties"]["either"]["seen"], true);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let schema = object(json!({
            "type": "object",
            "properties": {"a": {"type": "string"}}
        }));
        let before = schema.clone();

        let marker = Marker {
            options: WalkOptions::default(),
        };
        walk(&schema, &marker, None).unwrap();
        assert_eq!(schema, before);
    }

    #[test]
    fn test_defs_handled_separately_without_inlining() {
        let schema = object(json!({
            "type": "object",
            "properties": {"user": {"$ref": "#/$defs/User"}},
            "$defs": {"User": {"type": "object", "properties": {"id": {"type": "integer"}}}}
        }));

        let marker = Marker {
            options: WalkOptions::default(),
        };
        let result = walk(&schema, &marker, None).unwrap().into_value();

        assert_eq!(result["properties"]["user"]["$ref"], "#/$defs/User");
        assert_eq!(result["$defs"]["User"]["seen"], true);
        assert_eq!(result["$defs"]["User"]["properties"]["id"]["seen"], true);
    }

    #[test]
    fn test_inlines_reference_chains() {
        let schema = object(json!({
            "$ref": "#/$defs/B",
            "$defs": {
                "A": {"type": "object", "properties": {"x": {"type": "integer"}}},
                "B": {"$ref": "#/$defs/A"}
            }
        }));

        let identity = Identity { options: inline() };
        let result = walk(&schema, &identity, None).unwrap().into_value();

        assert_eq!(
            result,
            json!({"type": "object", "properties": {"x": {"type": "integer"}}})
        );
    }

    #[test]
    fn test_sibling_references_both_inlined() {
        let schema = object(json!({
            "type": "object",
            "properties": {
                "home": {"$ref": "#/$defs/Address"},
                "work": {"$ref": "#/$defs/Address"}
            },
            "$defs": {"Address": {"type": "object", "properties": {"city": {"type": "string"}}}}
        }));

        let identity = Identity { options: inline() };
        let result = walk(&schema, &identity, None).unwrap().into_value();

        assert_eq!(result["properties"]["home"]["properties"]["city"]["type"], "string");
        assert_eq!(result["properties"]["work"]["properties"]["city"]["type"], "string");
        assert!(result.get("$defs").is_none());
    }

    #[test]
    fn test_recursive_definitions_kept_under_defs() {
        let schema = object(json!({
            "$ref": "#/$defs/Node",
            "$defs": {
                "Node": {
                    "type": "object",
                    "properties": {
                        "label": {"$ref": "#/$defs/Label"},
                        "children": {"type": "array", "items": {"$ref": "#/$defs/Node"}}
                    }
                },
                "Label": {"type": "string"}
            }
        }));

        let identity = Identity { options: inline() };
        let result = walk(&schema, &identity, None).unwrap().into_value();

        assert_eq!(result["$ref"], "#/$defs/Node");
        let defs = result["$defs"].as_object().unwrap();
        assert_eq!(defs.len(), 1);
        let node = &defs["Node"];
        assert_eq!(node["properties"]["label"], json!({"type": "string"}));
        assert_eq!(node["properties"]["children"]["items"]["$ref"], "#/$defs/Node");
    }

    #[test]
    fn test_recursive_root_key_avoids_collision() {
        let schema = object(json!({
            "title": "Tree",
            "type": "object",
            "properties": {"root": {"$ref": "#/$defs/Tree"}},
            "$defs": {
                "Tree": {
                    "type": "object",
                    "properties": {"next": {"$ref": "#/$defs/Tree"}}
                }
            }
        }));

        let identity = Identity { options: inline() };
        let result = walk(&schema, &identity, None).unwrap().into_value();

        assert_eq!(result["$ref"], "#/$defs/Tree_root");
        assert_eq!(result["$defs"]["Tree_root"]["title"], "Tree");
        assert_eq!(result["$defs"]["Tree"]["properties"]["next"]["$ref"], "#/$defs/Tree");
    }

    #[test]
    fn test_unresolvable_reference_fails() {
        let schema = object(json!({
            "type": "object",
            "properties": {"a": {"$ref": "#/$defs/Missing"}}
        }));

        let identity = Identity { options: inline() };
        let err = walk(&schema, &identity, None).unwrap_err();
        assert!(matches!(err, CompatError::UnresolvableReference(name) if name == "Missing"));
    }

    #[test]
    fn test_reference_in_unvisited_position_fails() {
        let schema = object(json!({
            "type": "object",
            "properties": {"a": {"allOf": [{"$ref": "#/$defs/A"}]}},
            "$defs": {"A": {"type": "string"}}
        }));

        let identity = Identity { options: inline() };
        let err = walk(&schema, &identity, None).unwrap_err();
        assert!(matches!(err, CompatError::UnsupportedFeature(msg) if msg.contains("`A`")));

        let multi_type = object(json!({
            "type": ["object", "null"],
            "properties": {"a": {"$ref": "#/$defs/A"}},
            "$defs": {"A": {"type": "string"}}
        }));
        assert!(walk(&multi_type, &identity, None).is_err());
    }

    #[test]
    fn test_reference_shaped_default_ignored() {
        let schema = object(json!({
            "type": "object",
            "default": {"$ref": "not-a-schema"},
            "properties": {"a": {"type": "string", "examples": [{"$ref": "x"}]}}
        }));

        let identity = Identity { options: inline() };
        let result = walk(&schema, &identity, None).unwrap();
        assert_eq!(result.schema, schema);
    }

    #[test]
    fn test_unvisited_reference_kept_without_inlining() {
        let schema = object(json!({
            "allOf": [{"$ref": "#/$defs/A"}],
            "$defs": {"A": {"type": "string"}}
        }));

        let identity = Identity {
            options: WalkOptions::default(),
        };
        let result = walk(&schema, &identity, None).unwrap();
        assert_eq!(result.schema, schema);
    }

    #[test]
    fn test_references_untouched_without_inlining() {
        let schema = object(json!({"$ref": "#/$defs/Missing"}));

        let identity = Identity {
            options: WalkOptions::default(),
        };
        let result = walk(&schema, &identity, None).unwrap();
        assert_eq!(result.schema, schema);
    }

    #[test]
    fn test_nullable_union_simplified() {
        let schema = object(json!({"anyOf": [{"type": "string"}, {"type": "null"}]}));

        let identity = Identity {
            options: WalkOptions {
                prefer_inlined_defs: false,
                simplify_nullable_unions: true,
            },
        };
        let result = walk(&schema, &identity, None).unwrap().into_value();
        assert_eq!(result, json!({"type": "string", "nullable": true}));
    }

    #[test]
    fn test_nullable_union_kept_without_simplification() {
        let schema = object(json!({"anyOf": [{"type": "string"}, {"type": "null"}]}));

        let identity = Identity {
            options: WalkOptions::default(),
        };
        let result = walk(&schema, &identity, None).unwrap();
        assert_eq!(result.schema, schema);
    }

    #[test]
    fn test_wider_unions_not_simplified() {
        let schema = object(json!({
            "anyOf": [{"type": "string"}, {"type": "integer"}, {"type": "null"}]
        }));

        let identity = Identity {
            options: WalkOptions {
                prefer_inlined_defs: false,
                simplify_nullable_unions: true,
            },
        };
        let result = walk(&schema, &identity, None).unwrap();
        assert_eq!(result.schema, schema);
    }

    #[test]
    fn test_singleton_union_unwrapped() {
        let schema = object(json!({"oneOf": [{"type": "integer", "minimum": 0}]}));

        let identity = Identity {
            options: WalkOptions::default(),
        };
        let result = walk(&schema, &identity, None).unwrap().into_value();
        assert_eq!(result, json!({"type": "integer", "minimum": 0}));
    }

    #[test]
    fn test_depth_bound() {
        let mut schema = json!({"type": "string"});
        for _ in 0..10 {
            schema = json!({"type": "array", "items": schema});
        }
        let schema = object(schema);

        let identity = Identity {
            options: WalkOptions::default(),
        };
        let err = Walker::new(&identity).max_depth(5).walk(&schema).unwrap_err();
        assert!(matches!(err, CompatError::DepthExceeded(5)));

        assert!(Walker::new(&identity).max_depth(11).walk(&schema).is_ok());
    }

    #[test]
    fn test_transform_called_once_per_node() {
        let schema = object(json!({
            "type": "object",
            "properties": {
                "a": {"type": "string"},
                "b": {"type": "array", "items": {"type": "integer"}}
            }
        }));

        let mut mock = MockSchemaTransformer::new();
        mock.expect_walk_options()
            .return_const(WalkOptions::default());
        mock.expect_transform()
            .times(4)
            .returning(|schema, _| Ok(schema));
        mock.expect_finish()
            .times(1)
            .returning(|schema, _| Ok(schema));

        let result = walk(&schema, &mock, Some(true)).unwrap();
        assert_eq!(result.schema, schema);
        assert!(result.is_strict_compatible);
    }

    #[test]
    fn test_transform_errors_propagate() {
        let schema = object(json!({"type": "string"}));

        let mut mock = MockSchemaTransformer::new();
        mock.expect_walk_options()
            .return_const(WalkOptions::default());
        mock.expect_transform()
            .returning(|_, _| Err(CompatError::UnsupportedFeature("nope".to_string())));

        let err = walk(&schema, &mock, None).unwrap_err();
        assert!(matches!(err, CompatError::UnsupportedFeature(_)));
    }

    #[test]
    fn test_context_warnings_deduplicated() {
        let mut ctx = WalkContext::new(None);
        ctx.warn("dropped");
        ctx.warn("dropped");
        ctx.warn("other");
        assert_eq!(ctx.warnings(), ["dropped".to_string(), "other".to_string()]);
    }

    #[test]
    fn test_strict_compatibility_is_monotonic() {
        let mut ctx = WalkContext::new(None);
        assert!(ctx.is_strict_compatible());
        ctx.mark_strict_incompatible();
        ctx.mark_strict_incompatible();
        assert!(!ctx.is_strict_compatible());
    }
}
