//! Template resolution
//!
//! Flattens an entry template and everything it transitively includes into
//! one ordered task list. Traversal is depth-first and pre-order: a
//! template's own tasks come first, then each include in declared order.
//! Every canonical path is expanded at most once per resolution, which
//! terminates cycles and collapses diamonds (first reach wins).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use super::paths::canonical_path;
use super::source::TemplateSource;
use crate::domain::{Task, Template};

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to parse template {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Output of one resolution call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Flattened tasks in traversal order
    pub tasks: Vec<Task>,

    /// Canonical paths of every template visited, in visit order
    pub visited: Vec<PathBuf>,
}

/// Visited-path accumulator owned by a single resolution call
#[derive(Debug, Default)]
struct ResolveContext {
    seen: HashSet<PathBuf>,
    order: Vec<PathBuf>,
}

impl ResolveContext {
    /// Marks a path visited; returns false if it already was
    fn visit(&mut self, path: &Path) -> bool {
        if self.seen.contains(path) {
            return false;
        }
        self.seen.insert(path.to_path_buf());
        self.order.push(path.to_path_buf());
        true
    }
}

/// Resolves template names relative to a base directory
pub struct Resolver<S> {
    source: S,
    base_dir: PathBuf,
}

impl<S: TemplateSource> Resolver<S> {
    pub fn new(source: S, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolves one entry template into its flattened task list
    pub fn resolve(&self, entry: &str) -> Result<Resolution, TemplateError> {
        let mut ctx = ResolveContext::default();
        let path = canonical_path(&self.base_dir, entry);
        ctx.visit(&path);

        let tasks = self.expand(&path, &mut ctx)?;
        debug!(
            entry,
            tasks = tasks.len(),
            templates = ctx.order.len(),
            "resolved template"
        );

        Ok(Resolution {
            tasks,
            visited: ctx.order,
        })
    }

    /// Resolves several entry templates independently and concatenates them
    ///
    /// Each entry gets its own visited set, so a template shared by two
    /// entries contributes once per entry.
    pub fn resolve_all<T: AsRef<str>>(&self, entries: &[T]) -> Result<Vec<Task>, TemplateError> {
        let mut tasks = Vec::new();
        for entry in entries {
            tasks.extend(self.resolve(entry.as_ref())?.tasks);
        }
        Ok(tasks)
    }

    fn expand(&self, path: &Path, ctx: &mut ResolveContext) -> Result<Vec<Task>, TemplateError> {
        let template = self.load(path)?;
        let mut tasks = template.tasks;

        for include in &template.includes {
            let child = canonical_path(&self.base_dir, include);
            if !ctx.visit(&child) {
                debug!(include = %child.display(), "skipping already visited template");
                continue;
            }
            tasks.extend(self.expand(&child, ctx)?);
        }

        Ok(tasks)
    }

    /// Loads one template; unreadable files count as empty templates
    fn load(&self, path: &Path) -> Result<Template, TemplateError> {
        let bytes = match self.source.read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "could not read template, treating it as empty");
                return Ok(Template::default());
            }
        };

        Template::from_yaml(&bytes).map_err(|source| TemplateError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::source::{MemoryTemplateSource, SourceError};
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Wraps a source and counts reads per path
    struct CountingSource {
        inner: MemoryTemplateSource,
        reads: RefCell<HashMap<PathBuf, usize>>,
    }

    impl CountingSource {
        fn new(inner: MemoryTemplateSource) -> Self {
            Self {
                inner,
                reads: RefCell::new(HashMap::new()),
            }
        }
    }

    impl TemplateSource for CountingSource {
        fn read(&self, path: &Path) -> Result<Vec<u8>, SourceError> {
            *self.reads.borrow_mut().entry(path.to_path_buf()).or_default() += 1;
            self.inner.read(path)
        }
    }

    fn template(includes: &[&str], titles: &[&str]) -> String {
        let mut yaml = String::from("version: \"1\"\nincludes:\n");
        for include in includes {
            yaml.push_str(&format!("  - {}\n", include));
        }
        if includes.is_empty() {
            yaml = String::from("version: \"1\"\nincludes: []\n");
        }
        yaml.push_str("tasks:\n");
        for title in titles {
            yaml.push_str(&format!("  - title: {}\n", title));
        }
        if titles.is_empty() {
            yaml.push_str("  []\n");
        }
        yaml
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn template_without_includes_returns_own_tasks() {
        let source = MemoryTemplateSource::new()
            .with("/t/a.yaml", template(&[], &["one", "two", "three"]));
        let resolver = Resolver::new(source, "/t");

        let resolution = resolver.resolve("a.yaml").unwrap();
        assert_eq!(titles(&resolution.tasks), vec!["one", "two", "three"]);
        assert_eq!(resolution.visited, vec![PathBuf::from("/t/a.yaml")]);
    }

    #[test]
    fn includes_follow_own_tasks_depth_first() {
        let source = MemoryTemplateSource::new()
            .with("/t/a.yaml", template(&["b.yaml", "d.yaml"], &["a1"]))
            .with("/t/b.yaml", template(&["c.yaml"], &["b1", "b2"]))
            .with("/t/c.yaml", template(&[], &["c1"]))
            .with("/t/d.yaml", template(&[], &["d1"]));
        let resolver = Resolver::new(source, "/t");

        let resolution = resolver.resolve("a.yaml").unwrap();
        assert_eq!(titles(&resolution.tasks), vec!["a1", "b1", "b2", "c1", "d1"]);
    }

    #[test]
    fn diamond_contributes_once() {
        // A -> [B, C], B -> [C]
        let source = CountingSource::new(
            MemoryTemplateSource::new()
                .with("/t/a.yaml", template(&["b.yaml", "c.yaml"], &["a"]))
                .with("/t/b.yaml", template(&["c.yaml"], &["b"]))
                .with("/t/c.yaml", template(&[], &["c"])),
        );
        let resolver = Resolver::new(source, "/t");

        let resolution = resolver.resolve("a.yaml").unwrap();
        assert_eq!(titles(&resolution.tasks), vec!["a", "b", "c"]);
        assert_eq!(
            resolution.visited,
            vec![
                PathBuf::from("/t/a.yaml"),
                PathBuf::from("/t/b.yaml"),
                PathBuf::from("/t/c.yaml"),
            ]
        );
        assert!(resolver.source.reads.borrow().values().all(|&n| n == 1));
    }

    #[test]
    fn cycle_terminates() {
        // A -> B -> A
        let source = MemoryTemplateSource::new()
            .with("/t/a.yaml", template(&["b.yaml"], &["a"]))
            .with("/t/b.yaml", template(&["a.yaml"], &["b"]));
        let resolver = Resolver::new(source, "/t");

        let resolution = resolver.resolve("a.yaml").unwrap();
        assert_eq!(titles(&resolution.tasks), vec!["a", "b"]);
    }

    #[test]
    fn self_include_is_ignored() {
        let source = MemoryTemplateSource::new().with("/t/a.yaml", template(&["./a.yaml"], &["a"]));
        let resolver = Resolver::new(source, "/t");

        assert_eq!(titles(&resolver.resolve("a.yaml").unwrap().tasks), vec!["a"]);
    }

    #[test]
    fn equivalent_spellings_share_identity() {
        let source = MemoryTemplateSource::new()
            .with("/t/a.yaml", template(&["sub/../c.yaml", "./c.yaml", "c.yaml"], &["a"]))
            .with("/t/c.yaml", template(&[], &["c"]));
        let resolver = Resolver::new(source, "/t");

        assert_eq!(titles(&resolver.resolve("a.yaml").unwrap().tasks), vec!["a", "c"]);
    }

    #[test]
    fn missing_include_is_tolerated() {
        let source = MemoryTemplateSource::new()
            .with("/t/a.yaml", template(&["missing.yaml", "b.yaml"], &["a"]))
            .with("/t/b.yaml", template(&[], &["b"]));
        let resolver = Resolver::new(source, "/t");

        let resolution = resolver.resolve("a.yaml").unwrap();
        assert_eq!(titles(&resolution.tasks), vec!["a", "b"]);
        assert_eq!(resolution.visited.len(), 3);
    }

    #[test]
    fn missing_entry_resolves_to_nothing() {
        let resolver = Resolver::new(MemoryTemplateSource::new(), "/t");
        assert!(resolver.resolve("nope.yaml").unwrap().tasks.is_empty());
    }

    #[test]
    fn malformed_entry_is_fatal() {
        let source = MemoryTemplateSource::new().with("/t/a.yaml", "tasks: [title: {");
        let resolver = Resolver::new(source, "/t");

        let err = resolver.resolve("a.yaml").unwrap_err();
        let TemplateError::Parse { path, .. } = err;
        assert_eq!(path, PathBuf::from("/t/a.yaml"));
    }

    #[test]
    fn malformed_include_is_fatal() {
        let source = MemoryTemplateSource::new()
            .with("/t/a.yaml", template(&["b.yaml"], &["a"]))
            .with("/t/b.yaml", "tasks: 7");
        let resolver = Resolver::new(source, "/t");

        assert!(resolver.resolve("a.yaml").is_err());
    }

    #[test]
    fn includes_resolve_against_base_directory() {
        let source = MemoryTemplateSource::new()
            .with("/t/ops/a.yaml", template(&["common/b.yaml"], &["a"]))
            .with("/t/common/b.yaml", template(&[], &["b"]));
        let resolver = Resolver::new(source, "/t");

        assert_eq!(titles(&resolver.resolve("ops/a.yaml").unwrap().tasks), vec!["a", "b"]);
    }

    #[test]
    fn resolve_all_uses_fresh_visited_set_per_entry() {
        let source = MemoryTemplateSource::new()
            .with("/t/a.yaml", template(&["shared.yaml"], &["a"]))
            .with("/t/b.yaml", template(&["shared.yaml"], &["b"]))
            .with("/t/shared.yaml", template(&[], &["s"]));
        let resolver = Resolver::new(source, "/t");

        let tasks = resolver.resolve_all(&["a.yaml", "b.yaml"]).unwrap();
        assert_eq!(titles(&tasks), vec!["a", "s", "b", "s"]);
    }

    /// Builds a random include graph where template `n` has one task `tN`
    fn graph_source(edges: &[Vec<usize>]) -> MemoryTemplateSource {
        let mut source = MemoryTemplateSource::new();
        for (node, targets) in edges.iter().enumerate() {
            let includes: Vec<String> = targets.iter().map(|t| format!("n{}.yaml", t)).collect();
            let includes: Vec<&str> = includes.iter().map(String::as_str).collect();
            let title = format!("t{}", node);
            source.insert(format!("/g/n{}.yaml", node), template(&includes, &[title.as_str()]));
        }
        source
    }

    fn reachable(edges: &[Vec<usize>], start: usize) -> HashSet<usize> {
        let mut seen = HashSet::from([start]);
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            for &next in &edges[node] {
                if seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        seen
    }

    fn arb_graph() -> impl Strategy<Value = Vec<Vec<usize>>> {
        (1usize..8).prop_flat_map(|n| {
            prop::collection::vec(prop::collection::vec(0..n, 0..4), n)
        })
    }

    proptest! {
        #[test]
        fn every_template_read_at_most_once(edges in arb_graph()) {
            let source = CountingSource::new(graph_source(&edges));
            let resolver = Resolver::new(source, "/g");

            let resolution = resolver.resolve("n0.yaml").unwrap();

            prop_assert!(resolver.source.reads.borrow().values().all(|&n| n == 1));

            let unique: HashSet<_> = resolution.visited.iter().collect();
            prop_assert_eq!(unique.len(), resolution.visited.len());

            let expected: HashSet<String> =
                reachable(&edges, 0).into_iter().map(|n| format!("t{}", n)).collect();
            let emitted: Vec<&str> = titles(&resolution.tasks);
            let emitted_set: HashSet<String> = emitted.iter().map(|s| s.to_string()).collect();
            prop_assert_eq!(emitted.len(), emitted_set.len());
            prop_assert_eq!(emitted_set, expected);
            prop_assert_eq!(emitted.first().copied(), Some("t0"));
        }
    }
}
