//! Per-method route registration and lookup.
//!
//! A [`Router`] keeps, for every [`Method`], a [`Tree`], a map of static
//! routes served by exact string lookup, and a [`RouteCache`] of recent tree
//! results. [`Router::find`] consults them in that order of speed: static
//! map, then cache, then tree.
//!
//! # Examples
//!
//! ```
//! use forest_router_http::routing::router::Router;
//! use forest_router_core::Method;
//!
//! let mut router = Router::new();
//! router.get("/users/list", "list-users").unwrap();
//! router.get("/users/:id", "show-user").unwrap();
//! router.add([Method::Put, Method::Patch], "/users/:id", "update-user").unwrap();
//!
//! let m = router.find(Method::Get, "/users/42").unwrap();
//! assert_eq!(m.handler, "show-user");
//! assert_eq!(m.params.get("id").unwrap(), "42");
//!
//! assert_eq!(router.find(Method::Get, "/users/list").unwrap().handler, "list-users");
//! assert!(router.find(Method::Delete, "/users/42").is_none());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use forest_router_core::{Method, RouterResult, Settings};

use super::cache::RouteCache;
use super::segment;
use super::tree::{Params, Tree};

/// The result of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<H> {
    /// Values captured from dynamic segments, keyed by name.
    pub params: Params,
    /// The handler registered for the matched route.
    pub handler: H,
}

/// A router shared between threads behind one exclusive lock.
pub type SharedRouter<H> = Arc<Mutex<Router<H>>>;

/// Anything naming one or more methods for [`Router::add`] and
/// [`Router::remove`].
pub trait IntoMethods {
    fn into_methods(self) -> Vec<Method>;
}

impl IntoMethods for Method {
    fn into_methods(self) -> Vec<Method> {
        vec![self]
    }
}

impl IntoMethods for &[Method] {
    fn into_methods(self) -> Vec<Method> {
        self.to_vec()
    }
}

impl<const N: usize> IntoMethods for [Method; N] {
    fn into_methods(self) -> Vec<Method> {
        self.to_vec()
    }
}

impl IntoMethods for Vec<Method> {
    fn into_methods(self) -> Vec<Method> {
        self
    }
}

/// Everything a router keeps for one method.
struct MethodTable<H> {
    tree: Tree<H>,
    static_routes: HashMap<String, H>,
    cache: RouteCache<RouteMatch<H>>,
}

impl<H> MethodTable<H> {
    fn new(settings: &Settings) -> Self {
        Self {
            tree: Tree::new(),
            static_routes: HashMap::new(),
            cache: RouteCache::new(settings.max_cache_size),
        }
    }
}

/// Maps `(method, path)` pairs to registered handlers.
///
/// `find` takes `&mut self` because a tree hit is written to the cache.
/// Wrap the router in a lock ([`Router::into_shared`]) to use it from
/// several threads.
pub struct Router<H> {
    tables: [MethodTable<H>; Method::COUNT],
    settings: Settings,
}

impl<H> fmt::Debug for Router<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let routes: Vec<(Method, usize)> = Method::ALL
            .iter()
            .map(|&m| (m, self.tables[m.index()].tree.len()))
            .filter(|&(_, n)| n > 0)
            .collect();
        f.debug_struct("Router")
            .field("routes", &routes)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<H: Clone> Default for Router<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Clone> Router<H> {
    /// Creates a router with default settings.
    pub fn new() -> Self {
        Self::with_settings(&Settings::default())
    }

    /// Creates a router with the given settings.
    pub fn with_settings(settings: &Settings) -> Self {
        Self {
            tables: std::array::from_fn(|_| MethodTable::new(settings)),
            settings: settings.clone(),
        }
    }

    /// Returns the settings this router was built with.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Discards every registered route, static entry and cached result for
    /// all methods.
    pub fn reset(&mut self) {
        let settings = &self.settings;
        self.tables = std::array::from_fn(|_| MethodTable::new(settings));
        tracing::debug!("router reset");
    }

    /// Registers `handler` for `path` under each of `methods`.
    ///
    /// One leading and one trailing `/` are ignored, so `/users`, `users/`
    /// and `/users/` name the same route. Registering an existing route
    /// again replaces its handler.
    ///
    /// # Errors
    ///
    /// Returns a registration error for a regex segment that does not
    /// compile or that conflicts with a different pattern at the same
    /// position. Every method is checked first, so on error no method has
    /// the route.
    pub fn add(
        &mut self,
        methods: impl IntoMethods,
        path: &str,
        handler: H,
    ) -> RouterResult<&mut Self> {
        let path = segment::normalize(path);
        let segments = segment::split_normalized(path);
        let is_static = segment::is_static_route(path);
        let methods = methods.into_methods();

        for method in &methods {
            self.tables[method.index()].tree.check(&segments)?;
        }

        for method in methods {
            let table = &mut self.tables[method.index()];
            table.tree.add(&segments, handler.clone())?;

            if is_static {
                table
                    .static_routes
                    .insert(format!("/{path}"), handler.clone());
                table
                    .static_routes
                    .insert(format!("/{path}/"), handler.clone());
            }

            // A memoized result may now resolve to a different route.
            table.cache.clear();

            tracing::debug!(method = %method, route = %path, is_static, "route added");
        }

        Ok(self)
    }

    pub fn get(&mut self, path: &str, handler: H) -> RouterResult<&mut Self> {
        self.add(Method::Get, path, handler)
    }

    pub fn post(&mut self, path: &str, handler: H) -> RouterResult<&mut Self> {
        self.add(Method::Post, path, handler)
    }

    pub fn put(&mut self, path: &str, handler: H) -> RouterResult<&mut Self> {
        self.add(Method::Put, path, handler)
    }

    pub fn patch(&mut self, path: &str, handler: H) -> RouterResult<&mut Self> {
        self.add(Method::Patch, path, handler)
    }

    pub fn delete(&mut self, path: &str, handler: H) -> RouterResult<&mut Self> {
        self.add(Method::Delete, path, handler)
    }

    pub fn head(&mut self, path: &str, handler: H) -> RouterResult<&mut Self> {
        self.add(Method::Head, path, handler)
    }

    pub fn options(&mut self, path: &str, handler: H) -> RouterResult<&mut Self> {
        self.add(Method::Options, path, handler)
    }

    /// Unregisters `path` under each of `methods`.
    ///
    /// Returns `true` if at least one method had the route. Removing a route
    /// that is not registered is a no-op.
    pub fn remove(&mut self, methods: impl IntoMethods, path: &str) -> bool {
        let path = segment::normalize(path);
        let segments = segment::split_normalized(path);
        let is_static = segment::is_static_route(path);
        let keys = [format!("/{path}"), format!("/{path}/")];

        let mut any_removed = false;
        for method in methods.into_methods() {
            let table = &mut self.tables[method.index()];
            let removed = table.tree.remove(&segments);

            for key in &keys {
                if is_static {
                    table.static_routes.remove(key);
                }
                table.cache.del(key);
            }
            // Other cached paths may have resolved through the removed leaf.
            if removed {
                table.cache.clear();
            }

            tracing::debug!(method = %method, route = %path, removed, "route removed");
            any_removed |= removed;
        }

        any_removed
    }

    /// Resolves `path` for `method`.
    ///
    /// The raw path is used as given for the static map and cache lookups;
    /// only the tree lookup splits it into segments. Returns `None` when no
    /// registered route matches.
    pub fn find(&mut self, method: Method, path: &str) -> Option<RouteMatch<H>> {
        let use_cache = self.settings.use_cache;
        let decode = self.settings.decode_url_params;
        let table = &mut self.tables[method.index()];

        if let Some(handler) = table.static_routes.get(path) {
            tracing::trace!(method = %method, path, "static route hit");
            return Some(RouteMatch {
                params: Params::new(),
                handler: handler.clone(),
            });
        }

        if use_cache {
            if let Some(cached) = table.cache.get(path) {
                tracing::trace!(method = %method, path, "cache hit");
                return Some(cached.clone());
            }
        }

        let segments = segment::split_lookup(path);
        let Some((leaf, params)) = table.tree.match_path(&segments, decode) else {
            tracing::trace!(method = %method, path, "no route matched");
            return None;
        };
        tracing::trace!(method = %method, path, route = leaf.route(), "tree match");

        let found = RouteMatch {
            params,
            handler: leaf.handler().clone(),
        };
        if use_cache {
            table.cache.set(path, found.clone());
        }
        Some(found)
    }

    /// Like [`find`](Self::find), but parses the method name first.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::UnknownMethod`](forest_router_core::RouterError::UnknownMethod)
    /// if `method` is not a supported HTTP method.
    pub fn find_str(&mut self, method: &str, path: &str) -> RouterResult<Option<RouteMatch<H>>> {
        let method: Method = method.parse()?;
        Ok(self.find(method, path))
    }

    /// Registered routes for `method`, sorted.
    pub fn routes(&self, method: Method) -> Vec<String> {
        self.tables[method.index()].tree.routes()
    }

    /// Total number of registered `(method, route)` pairs.
    pub fn len(&self) -> usize {
        self.tables.iter().map(|t| t.tree.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.iter().all(|t| t.tree.is_empty())
    }

    /// Number of cached lookup results for `method`.
    pub fn cached_len(&self, method: Method) -> usize {
        self.tables[method.index()].cache.len()
    }

    /// Moves the router behind an `Arc<Mutex<_>>`.
    pub fn into_shared(self) -> SharedRouter<H> {
        Arc::new(Mutex::new(self))
    }
}
