//! A registry of schema documents and the identifiers found inside them.
//!
//! Every document is pre-scanned once before compilation: each object node
//! flows through a stasher that records `$id` scopes, anchors, dynamic
//! anchors and recursive anchors, so that references can later be mapped to
//! locations without re-walking the schema tree.
use std::sync::{Arc, RwLock};

use ahash::{AHashMap, AHashSet};
use serde_json::Value;

use crate::{pointer, uri::Uri, Draft, Error, Retrieve};

/// The base URI assigned to documents that do not declare an identifier.
pub const DEFAULT_ROOT_URI: &str = "json-schema:///";

#[derive(Debug, Clone)]
struct Entry {
    document: usize,
    pointer: String,
    base: Uri,
    draft: Draft,
}

#[derive(Debug)]
struct Document {
    contents: Arc<Value>,
}

#[derive(Debug, Default)]
struct Inner {
    documents: Vec<Document>,
    /// Fully-resolved identifier → the identified subschema.
    ids: AHashMap<Uri, Entry>,
    /// (resource base, anchor name) → subschema; first write wins.
    dynamic: AHashMap<(Uri, String), Entry>,
    /// Resource bases carrying `$recursiveAnchor: true`.
    recursive: AHashSet<Uri>,
}

/// Schema documents addressable during compilation and validation.
pub struct Registry {
    inner: RwLock<Inner>,
    retriever: Arc<dyn Retrieve>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").finish_non_exhaustive()
    }
}

/// The result of a successful reference resolution.
#[derive(Debug, Clone)]
pub struct Resolved {
    document: Arc<Value>,
    pointer: String,
    base: Uri,
    draft: Draft,
}

impl Resolved {
    /// The resolved subschema.
    ///
    /// # Errors
    ///
    /// Returns an error if the recorded pointer no longer matches the
    /// document, which indicates registry corruption.
    pub fn contents(&self) -> Result<&Value, Error> {
        pointer::walk(&self.document, &self.pointer)
    }
    /// The base URI in effect at the resolved subschema.
    #[must_use]
    pub fn base_uri(&self) -> &Uri {
        &self.base
    }
    /// The draft governing the resolved subschema.
    #[must_use]
    pub fn draft(&self) -> Draft {
        self.draft
    }
}

impl Registry {
    /// Create a registry holding the root schema document.
    #[must_use]
    pub fn new(root: Value, draft: Draft, retriever: Arc<dyn Retrieve>) -> Registry {
        let registry = Registry {
            inner: RwLock::new(Inner::default()),
            retriever,
        };
        let base = Uri::parse(DEFAULT_ROOT_URI);
        registry.add_document(base, draft, root);
        registry
    }

    /// The base URI of the root document.
    #[must_use]
    pub fn root_base_uri(&self) -> Uri {
        let root = Uri::parse(DEFAULT_ROOT_URI);
        let inner = self.read();
        match self.root_entry(&inner) {
            Some(entry) => entry.base.clone(),
            None => root,
        }
    }

    fn root_entry<'a>(&self, inner: &'a Inner) -> Option<&'a Entry> {
        inner
            .ids
            .values()
            .find(|entry| entry.document == 0 && entry.pointer.is_empty())
    }

    /// Register an additional addressable document under `uri`.
    pub fn add_resource(&self, uri: &str, draft: Draft, contents: Value) {
        self.add_document(Uri::parse(uri).base(), draft, contents);
    }

    fn add_document(&self, base_hint: Uri, draft: Draft, contents: Value) -> usize {
        let draft = draft.detect(&contents).unwrap_or(draft);
        let base = match draft.id_of(&contents) {
            Some(id) => Uri::inherit(&base_hint, Uri::parse(id)).base(),
            None => base_hint,
        };
        let mut inner = self.write();
        let index = inner.documents.len();
        inner.documents.push(Document {
            contents: Arc::new(contents),
        });
        let document = Arc::clone(&inner.documents[index].contents);
        inner.ids.entry(base.clone()).or_insert(Entry {
            document: index,
            pointer: String::new(),
            base: base.clone(),
            draft,
        });
        scan(&mut inner, index, &document, base, String::new(), draft);
        index
    }

    /// Resolve `reference` against `current_base`.
    ///
    /// Walks the resolution steps in order: exact identifier match, base
    /// match plus fragment walk, bare-fragment walk, retrieval. A miss at
    /// every step yields `None` after a logged warning; the caller degrades
    /// the referring node to an identity check.
    #[must_use]
    pub fn resolve(
        &self,
        current_base: &Uri,
        current_draft: Draft,
        reference: &str,
    ) -> Option<Resolved> {
        let uri = Uri::inherit(current_base, Uri::parse(reference));
        let base = uri.base();
        match self.resolve_known(&uri) {
            Ok(Some(resolved)) => return Some(resolved),
            Ok(None) if !self.knows(&base) => {
                // Unknown origin: delegate to the retriever once.
                match self.retriever.retrieve(&base) {
                    Ok(contents) => {
                        self.add_document(base.clone(), current_draft, contents);
                    }
                    Err(error) => {
                        log::warn!("cannot resolve reference '{reference}': {error}");
                        return None;
                    }
                }
            }
            Ok(None) => {
                log::warn!("reference '{reference}' points nowhere inside '{base}'");
                return None;
            }
            Err(error) => {
                log::warn!("cannot resolve reference '{reference}': {error}");
                return None;
            }
        }
        match self.resolve_known(&uri) {
            Ok(Some(resolved)) => Some(resolved),
            Ok(None) => {
                log::warn!("reference '{reference}' points nowhere inside '{base}'");
                None
            }
            Err(error) => {
                log::warn!("cannot resolve reference '{reference}': {error}");
                None
            }
        }
    }

    fn knows(&self, base: &Uri) -> bool {
        self.read().ids.contains_key(base)
    }

    fn resolve_known(&self, uri: &Uri) -> Result<Option<Resolved>, Error> {
        let inner = self.read();
        // Anchors are registered as full URIs with their fragment.
        if uri
            .fragment()
            .map_or(false, |f| !f.starts_with('/') && !f.is_empty())
        {
            if let Some(entry) = inner.ids.get(uri) {
                return Ok(Some(self.resolved_from(&inner, entry.clone(), "")?));
            }
            return Ok(None);
        }
        let base = uri.base();
        let fragment = uri.fragment().unwrap_or("").to_string();
        if let Some(entry) = inner.ids.get(&base) {
            let entry = entry.clone();
            return Ok(Some(self.resolved_from(&inner, entry, &fragment)?));
        }
        Ok(None)
    }

    /// Walk `fragment` below `entry`, updating the base URI and draft as
    /// identified subresources are crossed.
    fn resolved_from(
        &self,
        inner: &Inner,
        entry: Entry,
        fragment: &str,
    ) -> Result<Resolved, Error> {
        let document = Arc::clone(&inner.documents[entry.document].contents);
        let mut pointer = entry.pointer.clone();
        let mut base = entry.base.clone();
        let mut draft = entry.draft;
        let mut target = pointer::walk(&document, &pointer)?;
        for token in fragment.split('/').skip(1) {
            let token = pointer::decode_token(fragment, token)?;
            target = pointer::step(fragment, target, &token)?;
            pointer.push('/');
            pointer.push_str(&escape_token(&token));
            draft = draft.detect(target).unwrap_or(draft);
            if let Some(id) = draft.id_of(target) {
                base = Uri::inherit(&base, Uri::parse(id)).base();
            }
        }
        Ok(Resolved {
            document,
            pointer,
            base,
            draft,
        })
    }

    /// Look up a dynamic anchor inside one resource.
    #[must_use]
    pub fn dynamic_anchor(&self, resource: &Uri, name: &str) -> Option<Resolved> {
        let inner = self.read();
        let entry = inner
            .dynamic
            .get(&(resource.clone(), name.to_string()))?
            .clone();
        let document = Arc::clone(&inner.documents[entry.document].contents);
        Some(Resolved {
            document,
            pointer: entry.pointer,
            base: entry.base,
            draft: entry.draft,
        })
    }

    /// Whether a resource declares `$recursiveAnchor: true` at its root.
    #[must_use]
    pub fn has_recursive_anchor(&self, resource: &Uri) -> bool {
        self.read().recursive.contains(resource)
    }

    /// Resolve the root of one resource.
    #[must_use]
    pub fn resource_root(&self, resource: &Uri) -> Option<Resolved> {
        let inner = self.read();
        let entry = inner.ids.get(resource)?.clone();
        let document = Arc::clone(&inner.documents[entry.document].contents);
        Some(Resolved {
            document,
            pointer: entry.pointer,
            base: entry.base,
            draft: entry.draft,
        })
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().expect("registry lock poisoned")
    }
    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().expect("registry lock poisoned")
    }
}

fn escape_token(token: &str) -> String {
    if token.contains(['~', '/']) {
        token.replace('~', "~0").replace('/', "~1")
    } else {
        token.to_string()
    }
}

/// The identifier stasher. Walks a document and records every identifier and
/// anchor with the base URI in effect at its location.
///
/// `enum` and `const` values are data, not schemas, and are skipped.
fn scan(inner: &mut Inner, index: usize, value: &Value, base: Uri, path: String, draft: Draft) {
    match value {
        Value::Object(object) => {
            let draft = draft.detect(value).unwrap_or(draft);
            let mut base = base;
            if let Some(id) = draft.id_of(value) {
                base = Uri::inherit(&base, Uri::parse(id)).base();
                inner.ids.entry(base.clone()).or_insert(Entry {
                    document: index,
                    pointer: path.clone(),
                    base: base.clone(),
                    draft,
                });
            }
            let mut anchor = |inner: &mut Inner, name: &str| {
                inner
                    .ids
                    .entry(base.with_fragment(name))
                    .or_insert(Entry {
                        document: index,
                        pointer: path.clone(),
                        base: base.clone(),
                        draft,
                    });
            };
            if draft >= Draft::Draft201909 {
                if let Some(name) = object.get("$anchor").and_then(Value::as_str) {
                    anchor(inner, name);
                }
            } else if let Some(name) = object
                .get(draft.id_key())
                .and_then(Value::as_str)
                .and_then(|id| id.strip_prefix('#'))
            {
                anchor(inner, name);
            }
            if draft >= Draft::Draft202012 {
                if let Some(name) = object.get("$dynamicAnchor").and_then(Value::as_str) {
                    anchor(inner, name);
                    inner
                        .dynamic
                        .entry((base.clone(), name.to_string()))
                        .or_insert(Entry {
                            document: index,
                            pointer: path.clone(),
                            base: base.clone(),
                            draft,
                        });
                }
            }
            if draft == Draft::Draft201909
                && object.get("$recursiveAnchor").and_then(Value::as_bool) == Some(true)
            {
                inner.recursive.insert(base.clone());
            }
            for (key, child) in object {
                if matches!(key.as_str(), "enum" | "const") {
                    continue;
                }
                let child_path = format!("{path}/{}", escape_token(key));
                scan(inner, index, child, base.clone(), child_path, draft);
            }
        }
        Value::Array(items) => {
            for (position, child) in items.iter().enumerate() {
                let child_path = format!("{path}/{position}");
                scan(inner, index, child, base.clone(), child_path, draft);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::{Registry, DEFAULT_ROOT_URI};
    use crate::{DefaultRetriever, Draft, Retrieve, Uri};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn registry(root: Value) -> Registry {
        Registry::new(root, Draft::Draft202012, Arc::new(DefaultRetriever))
    }

    #[test]
    fn resolves_pointer_fragments() {
        let registry = registry(json!({
            "$defs": {"positive": {"minimum": 0}}
        }));
        let base = Uri::parse(DEFAULT_ROOT_URI);
        let resolved = registry
            .resolve(&base, Draft::Draft202012, "#/$defs/positive")
            .expect("resolvable");
        assert_eq!(resolved.contents().unwrap(), &json!({"minimum": 0}));
    }

    #[test]
    fn resolves_ids_and_anchors() {
        let registry = registry(json!({
            "$id": "http://example.com/root.json",
            "$defs": {
                "A": {"$id": "other.json", "type": "integer"},
                "B": {"$anchor": "drop", "type": "string"},
            }
        }));
        let base = registry.root_base_uri();
        assert_eq!(base.to_string(), "http://example.com/root.json");

        let by_id = registry
            .resolve(&base, Draft::Draft202012, "other.json")
            .expect("resolvable");
        assert_eq!(by_id.contents().unwrap()["type"], "integer");
        assert_eq!(by_id.base_uri().to_string(), "http://example.com/other.json");

        let by_anchor = registry
            .resolve(&base, Draft::Draft202012, "#drop")
            .expect("resolvable");
        assert_eq!(by_anchor.contents().unwrap()["type"], "string");
    }

    #[test]
    fn legacy_fragment_ids_are_anchors() {
        let registry = Registry::new(
            json!({
                "definitions": {"A": {"$id": "#foo", "type": "integer"}}
            }),
            Draft::Draft7,
            Arc::new(DefaultRetriever),
        );
        let base = registry.root_base_uri();
        let resolved = registry
            .resolve(&base, Draft::Draft7, "#foo")
            .expect("resolvable");
        assert_eq!(resolved.contents().unwrap()["type"], "integer");
    }

    #[test]
    fn identifiers_inside_enum_values_are_ignored() {
        let registry = registry(json!({
            "enum": [{"$id": "http://example.com/decoy", "$anchor": "decoy"}]
        }));
        let base = registry.root_base_uri();
        assert!(registry
            .resolve(&base, Draft::Draft202012, "http://example.com/decoy")
            .is_none());
    }

    #[test]
    fn unresolvable_references_yield_none() {
        let registry = registry(json!({}));
        let base = registry.root_base_uri();
        assert!(registry
            .resolve(&base, Draft::Draft202012, "http://example.com/missing.json")
            .is_none());
    }

    #[test]
    fn retrieval_registers_remote_documents() {
        struct OneDocument;
        impl Retrieve for OneDocument {
            fn retrieve(
                &self,
                uri: &Uri,
            ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
                if uri.to_string() == "http://example.com/integer.json" {
                    Ok(json!({"type": "integer"}))
                } else {
                    Err("unknown".into())
                }
            }
        }
        let registry = Registry::new(json!({}), Draft::Draft202012, Arc::new(OneDocument));
        let base = Uri::parse("http://example.com/root.json");
        let resolved = registry
            .resolve(&base, Draft::Draft202012, "integer.json")
            .expect("retrieved");
        assert_eq!(resolved.contents().unwrap(), &json!({"type": "integer"}));
        // Second resolution hits the registry, not the retriever.
        assert!(registry
            .resolve(&base, Draft::Draft202012, "integer.json#/type")
            .is_some());
    }

    #[test]
    fn dynamic_anchors_are_per_resource() {
        let registry = registry(json!({
            "$id": "http://example.com/root",
            "$dynamicAnchor": "items",
            "$defs": {
                "inner": {"$id": "inner", "$dynamicAnchor": "items", "type": "string"}
            }
        }));
        let root = Uri::parse("http://example.com/root");
        let inner = Uri::parse("http://example.com/inner");
        assert!(registry.dynamic_anchor(&root, "items").is_some());
        let nested = registry.dynamic_anchor(&inner, "items").expect("present");
        assert_eq!(nested.contents().unwrap()["type"], "string");
        assert!(registry.dynamic_anchor(&root, "other").is_none());
    }

    #[test]
    fn recursive_anchors_mark_resources() {
        let registry = Registry::new(
            json!({"$id": "http://example.com/tree", "$recursiveAnchor": true}),
            Draft::Draft201909,
            Arc::new(DefaultRetriever),
        );
        assert!(registry.has_recursive_anchor(&Uri::parse("http://example.com/tree")));
        assert!(!registry.has_recursive_anchor(&Uri::parse("http://example.com/other")));
    }
}
