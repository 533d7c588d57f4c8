//! The per-method segment trie.
//!
//! Each [`Tree`] owns a root node. A node has literal children keyed by exact
//! segment text, at most one param child and at most one pattern child
//! (wildcard or regex), and may own a [`Leaf`] when a route ends there.
//!
//! Matching tries, at every node and in this order: the literal child, the
//! param child, then the pattern child. A candidate that leads to a dead end
//! is abandoned and the next one is tried, so `/a/:x/b` still matches
//! `/a/lit/b` when a literal `lit` child exists but only leads to `/a/lit/c`.

use std::collections::HashMap;

use forest_router_core::{RouterError, RouterResult};

use super::segment::{self, SegmentKind, SegmentPattern};

/// Parameter bindings captured by a successful match.
pub type Params = HashMap<String, String>;

/// The terminal record of a registered route.
#[derive(Debug, Clone)]
pub struct Leaf<H> {
    handler: H,
    route: String,
}

impl<H> Leaf<H> {
    /// Returns the registered handler.
    pub const fn handler(&self) -> &H {
        &self.handler
    }

    /// Replaces the registered handler.
    pub fn set_handler(&mut self, handler: H) {
        self.handler = handler;
    }

    /// Returns the normalized route this leaf was registered under, e.g.
    /// `/users/:id`.
    pub fn route(&self) -> &str {
        &self.route
    }
}

#[derive(Debug)]
struct ParamChild<H> {
    name: String,
    node: Node<H>,
}

#[derive(Debug)]
struct PatternChild<H> {
    pattern: SegmentPattern,
    node: Node<H>,
}

#[derive(Debug)]
struct Node<H> {
    literal_children: HashMap<String, Node<H>>,
    param_child: Option<Box<ParamChild<H>>>,
    pattern_child: Option<Box<PatternChild<H>>>,
    leaf: Option<Leaf<H>>,
}

impl<H> Node<H> {
    fn new() -> Self {
        Self {
            literal_children: HashMap::new(),
            param_child: None,
            pattern_child: None,
            leaf: None,
        }
    }

    /// No leaf and no children: safe to prune.
    fn is_empty(&self) -> bool {
        self.leaf.is_none()
            && self.literal_children.is_empty()
            && self.param_child.is_none()
            && self.pattern_child.is_none()
    }

    fn child_or_insert(&mut self, segment: &str) -> RouterResult<&mut Self> {
        match segment::classify(segment) {
            SegmentKind::Literal => Ok(self
                .literal_children
                .entry(segment.to_string())
                .or_insert_with(Self::new)),
            SegmentKind::Param => {
                let name = &segment[1..];
                let child = self.param_child.get_or_insert_with(|| {
                    Box::new(ParamChild {
                        name: name.to_string(),
                        node: Self::new(),
                    })
                });
                if child.name != name {
                    tracing::debug!(
                        existing = %child.name,
                        requested = %name,
                        "param name differs from existing branch; keeping existing name"
                    );
                }
                Ok(&mut child.node)
            }
            SegmentKind::Wildcard | SegmentKind::Regex => {
                let child = match self.pattern_child.take() {
                    Some(child) if child.pattern.source() != segment => {
                        let existing = child.pattern.source().to_string();
                        self.pattern_child = Some(child);
                        return Err(RouterError::ConflictingPattern {
                            existing,
                            segment: segment.to_string(),
                        });
                    }
                    Some(child) => child,
                    None => Box::new(PatternChild {
                        pattern: SegmentPattern::compile(segment)?,
                        node: Self::new(),
                    }),
                };
                Ok(&mut self.pattern_child.insert(child).node)
            }
        }
    }

    /// Verifies that `segments` can be inserted below this node without
    /// creating anything.
    fn check(&self, segments: &[&str]) -> RouterResult<()> {
        let Some((&segment, rest)) = segments.split_first() else {
            return Ok(());
        };

        let next = match segment::classify(segment) {
            SegmentKind::Literal => self.literal_children.get(segment),
            SegmentKind::Param => self.param_child.as_ref().map(|child| &child.node),
            SegmentKind::Wildcard | SegmentKind::Regex => match &self.pattern_child {
                Some(child) if child.pattern.source() != segment => {
                    return Err(RouterError::ConflictingPattern {
                        existing: child.pattern.source().to_string(),
                        segment: segment.to_string(),
                    });
                }
                Some(child) => Some(&child.node),
                None => {
                    SegmentPattern::compile(segment)?;
                    None
                }
            },
        };

        match next {
            Some(node) => node.check(rest),
            None => check_new_branch(rest),
        }
    }

    /// Detaches the leaf at the end of `segments`, pruning children left
    /// empty. Returns `true` if a leaf was detached.
    fn remove(&mut self, segments: &[&str]) -> bool {
        let Some((&segment, rest)) = segments.split_first() else {
            return self.leaf.take().is_some();
        };

        match segment::classify(segment) {
            SegmentKind::Literal => {
                let Some(child) = self.literal_children.get_mut(segment) else {
                    return false;
                };
                let removed = child.remove(rest);
                if removed && child.is_empty() {
                    self.literal_children.remove(segment);
                }
                removed
            }
            SegmentKind::Param => {
                let Some(child) = self.param_child.as_mut() else {
                    return false;
                };
                let removed = child.node.remove(rest);
                if removed && child.node.is_empty() {
                    self.param_child = None;
                }
                removed
            }
            SegmentKind::Wildcard | SegmentKind::Regex => {
                let Some(child) = self
                    .pattern_child
                    .as_mut()
                    .filter(|child| child.pattern.source() == segment)
                else {
                    return false;
                };
                let removed = child.node.remove(rest);
                if removed && child.node.is_empty() {
                    self.pattern_child = None;
                }
                removed
            }
        }
    }

    /// Backtracking descent. `bindings` only grows along the successful path;
    /// every abandoned candidate truncates it back to where it started.
    fn find<'a>(
        &'a self,
        segments: &[&str],
        index: usize,
        decode: bool,
        bindings: &mut Vec<(String, String)>,
    ) -> Option<&'a Leaf<H>> {
        let Some(&token) = segments.get(index) else {
            return self
                .leaf
                .as_ref()
                .or_else(|| self.find_remainder(segments, index, decode, bindings));
        };

        if let Some(child) = self.literal_children.get(token) {
            if let Some(leaf) = child.find(segments, index + 1, decode, bindings) {
                return Some(leaf);
            }
        }

        if let Some(child) = &self.param_child {
            if !token.is_empty() {
                let mark = bindings.len();
                bindings.push((child.name.clone(), segment::bind_value(token, decode)));
                if let Some(leaf) = child.node.find(segments, index + 1, decode, bindings) {
                    return Some(leaf);
                }
                bindings.truncate(mark);
            }
        }

        if let Some(child) = &self.pattern_child {
            if let Some(captured) = child.pattern.captures(token, decode) {
                let mark = bindings.len();
                bindings.extend(captured);
                if let Some(leaf) = child.node.find(segments, index + 1, decode, bindings) {
                    return Some(leaf);
                }
                bindings.truncate(mark);
            }
            // A single remaining token was already tried above.
            if index + 1 < segments.len() {
                return self.find_remainder(segments, index, decode, bindings);
            }
        }

        None
    }

    /// Lets a terminal wildcard child consume `segments[index..]` joined by `/`.
    fn find_remainder<'a>(
        &'a self,
        segments: &[&str],
        index: usize,
        decode: bool,
        bindings: &mut Vec<(String, String)>,
    ) -> Option<&'a Leaf<H>> {
        let child = self.pattern_child.as_ref()?;
        if !child.pattern.is_wildcard() {
            return None;
        }
        let leaf = child.node.leaf.as_ref()?;
        let remainder = segment::join_from(index, segments);
        let captured = child.pattern.captures(&remainder, decode)?;
        bindings.extend(captured);
        Some(leaf)
    }

    fn collect_routes<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(leaf) = &self.leaf {
            out.push(leaf.route());
        }
        for child in self.literal_children.values() {
            child.collect_routes(out);
        }
        if let Some(child) = &self.param_child {
            child.node.collect_routes(out);
        }
        if let Some(child) = &self.pattern_child {
            child.node.collect_routes(out);
        }
    }
}

/// Compiles every pattern segment of a branch that does not exist yet.
fn check_new_branch(segments: &[&str]) -> RouterResult<()> {
    for segment in segments {
        if matches!(
            segment::classify(segment),
            SegmentKind::Wildcard | SegmentKind::Regex
        ) {
            SegmentPattern::compile(segment)?;
        }
    }
    Ok(())
}

/// A segment trie holding every route registered for one method.
#[derive(Debug)]
pub struct Tree<H> {
    root: Node<H>,
    len: usize,
}

impl<H> Default for Tree<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> Tree<H> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self {
            root: Node::new(),
            len: 0,
        }
    }

    /// Registers `segments` and attaches `handler` to the terminal leaf.
    ///
    /// Registering the same segments again replaces the handler of the
    /// existing leaf. Returns the terminal leaf.
    ///
    /// # Errors
    ///
    /// Fails as [`Tree::check`] does. The tree is left unchanged on error.
    pub fn add(&mut self, segments: &[&str], handler: H) -> RouterResult<&mut Leaf<H>> {
        self.check(segments)?;

        let mut node = &mut self.root;
        for segment in segments {
            node = node.child_or_insert(segment)?;
        }

        let leaf = match node.leaf.take() {
            Some(mut leaf) => {
                leaf.set_handler(handler);
                leaf
            }
            None => {
                self.len += 1;
                Leaf {
                    handler,
                    route: format!("/{}", segments.join("/")),
                }
            }
        };
        Ok(node.leaf.insert(leaf))
    }

    /// Reports whether [`Tree::add`] would accept `segments`, without
    /// modifying the tree.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidPattern`] for a regex segment that does
    /// not compile, and [`RouterError::ConflictingPattern`] when a node on the
    /// path already holds a different wildcard/regex child.
    pub fn check(&self, segments: &[&str]) -> RouterResult<()> {
        self.root.check(segments)
    }

    /// Detaches the leaf registered for `segments`, pruning nodes left
    /// empty. Removing a route that was never registered is a no-op that
    /// returns `false`.
    pub fn remove(&mut self, segments: &[&str]) -> bool {
        let removed = self.root.remove(segments);
        if removed {
            self.len -= 1;
        }
        removed
    }

    /// Resolves request `segments` to a leaf and the parameters captured on
    /// the way. With `decode` set, captured values are percent-decoded.
    pub fn match_path(&self, segments: &[&str], decode: bool) -> Option<(&Leaf<H>, Params)> {
        let mut bindings = Vec::new();
        let leaf = self.root.find(segments, 0, decode, &mut bindings)?;
        Some((leaf, bindings.into_iter().collect()))
    }

    /// Number of registered routes.
    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Registered routes, sorted.
    pub fn routes(&self) -> Vec<String> {
        let mut routes = Vec::with_capacity(self.len);
        self.root.collect_routes(&mut routes);
        routes.sort_unstable();
        routes.into_iter().map(String::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segs(path: &str) -> Vec<&str> {
        segment::split_normalized(segment::normalize(path))
    }

    fn lookup<'a>(tree: &'a Tree<&'static str>, path: &str) -> Option<(&'a str, Params)> {
        tree.match_path(&segment::split_lookup(path), false)
            .map(|(leaf, params)| (*leaf.handler(), params))
    }

    fn tree_with(routes: &[(&str, &'static str)]) -> Tree<&'static str> {
        let mut tree = Tree::new();
        for (path, handler) in routes {
            tree.add(&segs(path), *handler).unwrap();
        }
        tree
    }

    #[test]
    fn test_literal_match() {
        let tree = tree_with(&[("/users/list", "list")]);
        let (handler, params) = lookup(&tree, "/users/list").unwrap();
        assert_eq!(handler, "list");
        assert!(params.is_empty());
        assert!(lookup(&tree, "/users").is_none());
        assert!(lookup(&tree, "/users/list/more").is_none());
    }

    #[test]
    fn test_root_route() {
        let tree = tree_with(&[("/", "root")]);
        assert_eq!(lookup(&tree, "/").unwrap().0, "root");
        assert_eq!(lookup(&tree, "").unwrap().0, "root");
        assert!(lookup(&tree, "/x").is_none());
    }

    #[test]
    fn test_param_match() {
        let tree = tree_with(&[("/users/:id", "user")]);
        let (handler, params) = lookup(&tree, "/users/42").unwrap();
        assert_eq!(handler, "user");
        assert_eq!(params.get("id").unwrap(), "42");
        assert!(lookup(&tree, "/users/").is_none());
    }

    #[test]
    fn test_param_does_not_match_empty_token() {
        let tree = tree_with(&[("/a/:x/b", "h")]);
        assert!(lookup(&tree, "/a//b").is_none());
    }

    #[test]
    fn test_literal_precedes_param() {
        let tree = tree_with(&[("/users/:id", "user"), ("/users/list", "list")]);
        assert_eq!(lookup(&tree, "/users/list").unwrap().0, "list");
        assert_eq!(lookup(&tree, "/users/99").unwrap().0, "user");
    }

    #[test]
    fn test_backtracks_from_literal_to_param() {
        let tree = tree_with(&[("/a/:x/b", "param"), ("/a/lit/c", "literal")]);
        let (handler, params) = lookup(&tree, "/a/lit/b").unwrap();
        assert_eq!(handler, "param");
        assert_eq!(params.get("x").unwrap(), "lit");
        assert_eq!(lookup(&tree, "/a/lit/c").unwrap().0, "literal");
    }

    #[test]
    fn test_abandoned_bindings_do_not_leak() {
        let tree = tree_with(&[("/:a/x/y", "deep"), ("/b/:c/q", "other")]);
        // The literal "b" branch binds c = "x" and then dead-ends on "y".
        let (handler, params) = lookup(&tree, "/b/x/y").unwrap();
        assert_eq!(handler, "deep");
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("a").unwrap(), "b");
        assert!(!params.contains_key("c"));

        let (handler, params) = lookup(&tree, "/b/x/q").unwrap();
        assert_eq!(handler, "other");
        assert_eq!(params.get("c").unwrap(), "x");
    }

    #[test]
    fn test_backtracks_through_param_to_pattern() {
        let tree = tree_with(&[("/f/:name/meta", "meta"), ("/f/*", "files")]);
        let (handler, params) = lookup(&tree, "/f/a/b/c").unwrap();
        assert_eq!(handler, "files");
        assert_eq!(params.get("*").unwrap(), "a/b/c");
        assert!(!params.contains_key("name"));
    }

    #[test]
    fn test_wildcard_consumes_remainder() {
        let tree = tree_with(&[("/files/*", "files")]);
        let (handler, params) = lookup(&tree, "/files/a/b/c").unwrap();
        assert_eq!(handler, "files");
        assert_eq!(params.get("*").unwrap(), "a/b/c");
        assert_eq!(lookup(&tree, "/files/a").unwrap().1.get("*").unwrap(), "a");
        // An empty remainder still matches, with or without the slash.
        assert_eq!(lookup(&tree, "/files/").unwrap().1.get("*").unwrap(), "");
        assert_eq!(lookup(&tree, "/files").unwrap().1.get("*").unwrap(), "");
        assert!(lookup(&tree, "/file").is_none());
    }

    #[test]
    fn test_wildcard_with_regex_prefix_consumes_remainder() {
        let tree = tree_with(&[("/dl/a-*", "dl"), ("/file.*", "file")]);
        let (handler, params) = lookup(&tree, "/dl/a-b/c").unwrap();
        assert_eq!(handler, "dl");
        assert_eq!(params.get("*").unwrap(), "b/c");
        assert!(lookup(&tree, "/dl/ab/c").is_none());

        let (handler, params) = lookup(&tree, "/fileXtxt").unwrap();
        assert_eq!(handler, "file");
        assert_eq!(params.get("*").unwrap(), "txt");
    }

    #[test]
    fn test_prefix_wildcard() {
        let tree = tree_with(&[("/files*", "files")]);
        let (handler, params) = lookup(&tree, "/filesxyz").unwrap();
        assert_eq!(handler, "files");
        assert_eq!(params.get("*").unwrap(), "xyz");
        assert_eq!(lookup(&tree, "/files/deep/path").unwrap().1.get("*").unwrap(), "/deep/path");
        assert!(lookup(&tree, "/other").is_none());
    }

    #[test]
    fn test_wildcard_segment_prefers_deeper_route() {
        let tree = tree_with(&[("/a/x*", "short"), ("/a/x*/b", "long")]);
        assert_eq!(lookup(&tree, "/a/xy/b").unwrap().0, "long");
        assert_eq!(lookup(&tree, "/a/xy/c").unwrap().0, "short");
    }

    #[test]
    fn test_regex_segment() {
        let tree = tree_with(&[("/v(1|2)/status", "status"), ("/items/:id(\\d+)", "item")]);
        assert_eq!(lookup(&tree, "/v1/status").unwrap().0, "status");
        assert_eq!(lookup(&tree, "/v2/status").unwrap().0, "status");
        assert!(lookup(&tree, "/v3/status").is_none());

        let (handler, params) = lookup(&tree, "/items/7").unwrap();
        assert_eq!(handler, "item");
        assert_eq!(params.get("id").unwrap(), "7");
        assert!(lookup(&tree, "/items/abc").is_none());
    }

    #[test]
    fn test_param_precedes_regex() {
        let tree = tree_with(&[("/p/:any", "param"), ("/p/a-b", "regex")]);
        assert_eq!(lookup(&tree, "/p/a-b").unwrap().0, "param");
    }

    #[test]
    fn test_decode_params() {
        let tree = tree_with(&[("/users/:name", "user")]);
        let segments = segment::split_lookup("/users/jane%20doe");
        let (_, raw) = tree.match_path(&segments, false).unwrap();
        assert_eq!(raw.get("name").unwrap(), "jane%20doe");
        let (_, decoded) = tree.match_path(&segments, true).unwrap();
        assert_eq!(decoded.get("name").unwrap(), "jane doe");
    }

    #[test]
    fn test_re_registration_overwrites() {
        let mut tree = tree_with(&[("/users/:id", "old")]);
        tree.add(&segs("/users/:id"), "new").unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(lookup(&tree, "/users/1").unwrap().0, "new");
    }

    #[test]
    fn test_param_name_reused() {
        let tree = tree_with(&[("/users/:id", "user"), ("/users/:uid/posts", "posts")]);
        let (handler, params) = lookup(&tree, "/users/5/posts").unwrap();
        assert_eq!(handler, "posts");
        assert_eq!(params.get("id").unwrap(), "5");
    }

    #[test]
    fn test_add_returns_leaf() {
        let mut tree = Tree::new();
        let leaf = tree.add(&segs("/users/:id"), "user").unwrap();
        assert_eq!(leaf.route(), "/users/:id");
        leaf.set_handler("replaced");
        assert_eq!(lookup(&tree, "/users/1").unwrap().0, "replaced");
    }

    #[test]
    fn test_conflicting_pattern() {
        let mut tree = tree_with(&[("/img/(.+)\\.png", "png")]);
        let err = tree.add(&segs("/img/(.+)\\.jpg"), "jpg").unwrap_err();
        assert!(matches!(err, RouterError::ConflictingPattern { .. }));
        // The existing branch is intact.
        assert_eq!(lookup(&tree, "/img/a.png").unwrap().0, "png");
    }

    #[test]
    fn test_conflict_below_new_nodes_leaves_tree_unchanged() {
        let mut tree = tree_with(&[("/img/(.+)\\.png", "png")]);
        let err = tree.add(&segs("/img/(.+)\\.jpg/thumb"), "thumb");
        assert!(matches!(err, Err(RouterError::ConflictingPattern { .. })));
        assert!(matches!(
            tree.add(&segs("/new/deep/x-y/(.+)\\.jpg/a(b"), "bad"),
            Err(RouterError::InvalidPattern { .. })
        ));
        assert!(!tree.root.literal_children.contains_key("new"));
        assert_eq!(tree.routes(), vec!["/img/(.+)\\.png"]);
    }

    #[test]
    fn test_invalid_pattern() {
        let mut tree: Tree<&str> = Tree::new();
        let err = tree.add(&segs("/bad/a(b"), "bad").unwrap_err();
        assert!(matches!(err, RouterError::InvalidPattern { .. }));
        assert!(tree.is_empty());

        let err = tree.add(&segs("/bad/deep/a(b"), "bad").unwrap_err();
        assert!(matches!(err, RouterError::InvalidPattern { .. }));
        assert!(tree.root.is_empty());
    }

    #[test]
    fn test_check_does_not_modify() {
        let tree = tree_with(&[("/files/*", "files")]);
        assert!(tree.check(&segs("/users/:id/x-(\\d+)")).is_ok());
        assert!(tree.check(&segs("/files/*/meta")).is_ok());
        assert!(matches!(
            tree.check(&segs("/files/v(1|2)")),
            Err(RouterError::ConflictingPattern { .. })
        ));
        assert_eq!(tree.routes(), vec!["/files/*"]);
    }

    #[test]
    fn test_remove() {
        let mut tree = tree_with(&[("/users/:id", "user"), ("/users/list", "list")]);
        assert!(tree.remove(&segs("/users/list")));
        assert!(lookup(&tree, "/users/list").is_some_and(|(h, _)| h == "user"));
        assert_eq!(tree.len(), 1);

        assert!(tree.remove(&segs("/users/:id")));
        assert!(lookup(&tree, "/users/1").is_none());
        assert!(tree.is_empty());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut tree = tree_with(&[("/a/b", "ab")]);
        assert!(!tree.remove(&segs("/a/c")));
        assert!(!tree.remove(&segs("/a")));
        assert!(!tree.remove(&segs("/x/:y")));
        assert!(!tree.remove(&segs("/a/*")));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_remove_twice() {
        let mut tree = tree_with(&[("/files/*", "files")]);
        assert!(tree.remove(&segs("/files/*")));
        assert!(!tree.remove(&segs("/files/*")));
        assert!(lookup(&tree, "/files/a").is_none());
    }

    #[test]
    fn test_remove_prunes_empty_nodes() {
        let mut tree = tree_with(&[("/a/b/c", "abc")]);
        tree.remove(&segs("/a/b/c"));
        assert!(tree.root.is_empty());
    }

    #[test]
    fn test_remove_keeps_shared_prefix() {
        let mut tree = tree_with(&[("/a/b", "ab"), ("/a/b/c", "abc")]);
        tree.remove(&segs("/a/b/c"));
        assert_eq!(lookup(&tree, "/a/b").unwrap().0, "ab");
        tree.add(&segs("/a/b/c"), "again").unwrap();
        tree.remove(&segs("/a/b"));
        assert_eq!(lookup(&tree, "/a/b/c").unwrap().0, "again");
        assert!(lookup(&tree, "/a/b").is_none());
    }

    #[test]
    fn test_routes() {
        let tree = tree_with(&[("/b", "b"), ("/a/:id", "a"), ("/", "root"), ("/c/*", "c")]);
        assert_eq!(tree.routes(), vec!["/", "/a/:id", "/b", "/c/*"]);
    }
}
