//! Purpose: Identify where a failure was raised and map that site to a default hint.
//! Exports: `Origin`, `HintRegistry`, and the `origin!` macro.
//! Role: Hint-origin lookup; replaces runtime reflection with an explicit registry.
//! Invariants: Function-level hints win over scope-level hints; blank values never win.
//! Invariants: Lookup is total: unknown or missing origins resolve to `None`.
use std::collections::HashMap;
use std::fmt;
use std::panic::Location;
use std::path::Path;

const MARKER: &str = "__origin_marker";
const RUNTIME_CRATES: &[&str] = &[
    "std::",
    "core::",
    "alloc::",
    "__rustc::",
    "panic_unwind::",
    "panic_abort::",
];
const PANIC_ENTRIES: &[&str] = &[
    "std::panicking::",
    "core::panicking::",
    "std::panic::",
    "core::panic::",
];

/// Captures the enclosing function as an [`Origin`].
///
/// Closures collapse to the function that defines them.
#[macro_export]
macro_rules! origin {
    () => {{
        fn __origin_marker() {}
        $crate::core::origin::Origin::from_function_path(
            ::std::any::type_name_of_val(&__origin_marker),
            file!(),
            line!(),
        )
    }};
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Origin {
    scope: String,
    function: Option<String>,
    file: Option<String>,
    line: Option<u32>,
}

impl Origin {
    pub fn new(scope: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            function: Some(function.into()),
            file: None,
            line: None,
        }
    }

    pub fn in_scope(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            function: None,
            file: None,
            line: None,
        }
    }

    /// Origin of a bare source location: the file path doubles as the scope.
    pub fn from_location(location: &Location<'_>) -> Self {
        Self {
            scope: location.file().to_string(),
            function: None,
            file: Some(location.file().to_string()),
            line: Some(location.line()),
        }
    }

    #[doc(hidden)]
    pub fn from_function_path(path: &str, file: &str, line: u32) -> Self {
        let (scope, function) = parse_path(path);
        Self {
            scope,
            function,
            file: Some(file.to_string()),
            line: Some(line),
        }
    }

    /// Origin of the frame that raised the panic being reported.
    ///
    /// Walks the current stack past the panic runtime and parses the first
    /// caller symbol. Only meaningful inside a panic hook; `None` when no
    /// symbol resolves.
    pub fn panicking_frame() -> Option<Self> {
        let mut scan = FrameScan::default();
        backtrace::trace(|frame| {
            backtrace::resolve_frame(frame, |symbol| {
                if let Some(name) = symbol.name() {
                    let file = symbol.filename().map(|path| path.display().to_string());
                    scan.visit(&format!("{name:#}"), file, symbol.lineno());
                }
            });
            scan.found.is_none()
        });
        scan.found
    }

    /// Same scope and function, at `location`.
    pub fn located_at(mut self, location: &Location<'_>) -> Self {
        self.file = Some(location.file().to_string());
        self.line = Some(location.line());
        self
    }

    // A bare location in the same file as `frame` takes its scope and function.
    pub(crate) fn adopt(&mut self, frame: &Origin) {
        if self.function.is_some() {
            return;
        }
        let same_file = match (&self.file, &frame.file) {
            (Some(own), Some(theirs)) => Path::new(theirs).ends_with(own),
            _ => false,
        };
        if same_file {
            self.scope.clone_from(&frame.scope);
            self.function.clone_from(&frame.function);
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn function(&self) -> Option<&str> {
        self.function.as_deref()
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn line(&self) -> Option<u32> {
        self.line
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.scope)?;
        if let Some(function) = &self.function {
            write!(f, "::{function}")?;
        }
        if let (Some(file), Some(line)) = (&self.file, self.line) {
            write!(f, " ({file}:{line})")?;
        }
        Ok(())
    }
}

// Splits on `::` outside of angle brackets so `<impl a::B>` stays one segment.
fn split_path(path: &str) -> Vec<&str> {
    let bytes = path.as_bytes();
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut idx = 0usize;
    while idx < bytes.len() {
        match bytes[idx] {
            b'<' => depth += 1,
            b'>' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(idx + 1) == Some(&b':') => {
                segments.push(&path[start..idx]);
                idx += 2;
                start = idx;
                continue;
            }
            _ => {}
        }
        idx += 1;
    }
    segments.push(&path[start..]);
    segments.retain(|segment| !segment.is_empty());
    segments
}

fn parse_path(path: &str) -> (String, Option<String>) {
    let mut segments: Vec<&str> = split_path(path)
        .into_iter()
        .enumerate()
        .filter(|(idx, segment)| !(*idx > 0 && is_generic_args(segment)) && !is_symbol_hash(segment))
        .map(|(_, segment)| segment)
        .collect();
    if segments.last() == Some(&MARKER) {
        segments.pop();
    }
    while segments.last().is_some_and(|segment| is_closure(segment)) {
        segments.pop();
    }
    let function = segments.pop().map(str::to_string);

    let mut scope = String::new();
    for segment in segments {
        if let Some(self_type) = impl_self_type(segment) {
            scope = self_type.to_string();
            continue;
        }
        if !scope.is_empty() {
            scope.push_str("::");
        }
        scope.push_str(segment);
    }
    (scope, function)
}

// `{{closure}}` in legacy symbols, `{closure#0}` in v0 symbols.
fn is_closure(segment: &str) -> bool {
    segment.starts_with("{{closure") || segment.starts_with("{closure")
}

// Turbofish arguments such as the `<i32>` in `app::launch::<i32>`.
fn is_generic_args(segment: &str) -> bool {
    segment.starts_with('<') && !segment.starts_with("<impl ")
}

fn is_symbol_hash(segment: &str) -> bool {
    segment.len() == 17
        && segment.starts_with('h')
        && segment[1..].bytes().all(|byte| byte.is_ascii_hexdigit())
}

fn is_runtime(path: &str) -> bool {
    let path = path.trim_start_matches('<');
    !path.contains("::") || RUNTIME_CRATES.iter().any(|krate| path.starts_with(krate))
}

fn is_panic_entry(path: &str) -> bool {
    let path = path.trim_start_matches('<');
    path.contains("rust_begin_unwind")
        || path.contains("rust_panic")
        || PANIC_ENTRIES.iter().any(|entry| path.starts_with(entry))
}

// Frames arrive innermost first: the capture and hook frames, then the panic
// runtime, then the code that panicked.
#[derive(Default)]
struct FrameScan {
    past_panic: bool,
    found: Option<Origin>,
}

impl FrameScan {
    fn visit(&mut self, path: &str, file: Option<String>, line: Option<u32>) {
        if self.found.is_some() {
            return;
        }
        if !self.past_panic {
            self.past_panic = is_panic_entry(path);
            return;
        }
        if is_runtime(path) {
            return;
        }
        let (scope, function) = parse_path(path);
        self.found = Some(Origin {
            scope,
            function,
            file,
            line,
        });
    }
}

fn impl_self_type(segment: &str) -> Option<&str> {
    let inner = segment.strip_prefix('<')?.strip_suffix('>')?;
    let inner = inner.strip_prefix("impl ").unwrap_or(inner);
    let self_type = inner.split(" as ").next().unwrap_or(inner).trim();
    if self_type.is_empty() {
        None
    } else {
        Some(self_type)
    }
}

/// Default hints keyed by scope (a type or module path, or a source file) and
/// by function within a scope.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HintRegistry {
    scopes: HashMap<String, String>,
    functions: HashMap<(String, String), String>,
}

impl HintRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scope(mut self, scope: impl Into<String>, hint: impl Into<String>) -> Self {
        self.scopes.insert(scope.into(), hint.into());
        self
    }

    pub fn function(
        mut self,
        scope: impl Into<String>,
        function: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        self.functions
            .insert((scope.into(), function.into()), hint.into());
        self
    }

    /// Entries from `other` replace entries with the same key.
    pub fn merge(&mut self, other: HintRegistry) {
        self.scopes.extend(other.scopes);
        self.functions.extend(other.functions);
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty() && self.functions.is_empty()
    }

    pub fn lookup(&self, origin: Option<&Origin>) -> Option<&str> {
        let origin = origin?;
        let function_hint = origin.function().and_then(|function| {
            self.functions
                .get(&(origin.scope().to_string(), function.to_string()))
                .map(String::as_str)
        });
        if let Some(hint) = function_hint.filter(|hint| !hint.trim().is_empty()) {
            return Some(hint);
        }
        let scope_hint = self.scope_hint(origin.scope()).or_else(|| {
            origin
                .file()
                .filter(|file| *file != origin.scope())
                .and_then(|file| self.scope_hint(file))
        });
        if scope_hint.is_none() {
            tracing::trace!(origin = %origin, "no default hint registered for origin");
        }
        scope_hint
    }

    fn scope_hint(&self, scope: &str) -> Option<&str> {
        self.scopes
            .get(scope)
            .map(String::as_str)
            .filter(|hint| !hint.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::{FrameScan, HintRegistry, Origin};

    fn go_to_mars() -> Origin {
        crate::origin!()
    }

    #[test]
    fn macro_captures_enclosing_function_and_module() {
        let origin = go_to_mars();
        assert_eq!(origin.scope(), module_path!());
        assert_eq!(origin.function(), Some("go_to_mars"));
        assert_eq!(origin.file(), Some(file!()));
    }

    #[test]
    fn closures_collapse_to_enclosing_function() {
        let capture = || crate::origin!();
        let origin = capture();
        assert_eq!(origin.scope(), module_path!());
        assert_eq!(
            origin.function(),
            Some("closures_collapse_to_enclosing_function")
        );
    }

    #[test]
    fn method_paths_resolve_to_self_type() {
        let inherent =
            Origin::from_function_path("app::ship::Spaceship::go_to_mars::__origin_marker", "f.rs", 3);
        assert_eq!(inherent.scope(), "app::ship::Spaceship");
        assert_eq!(inherent.function(), Some("go_to_mars"));

        let impl_block = Origin::from_function_path(
            "app::ship::<impl app::ship::Spaceship>::go_to_mars::{{closure}}::__origin_marker",
            "f.rs",
            3,
        );
        assert_eq!(impl_block.scope(), "app::ship::Spaceship");
        assert_eq!(impl_block.function(), Some("go_to_mars"));

        let trait_impl = Origin::from_function_path(
            "<app::ship::Spaceship as app::Launch>::launch::__origin_marker",
            "f.rs",
            3,
        );
        assert_eq!(trait_impl.scope(), "app::ship::Spaceship");
        assert_eq!(trait_impl.function(), Some("launch"));
    }

    #[test]
    fn function_hint_wins_over_scope_hint() {
        let registry = HintRegistry::new()
            .scope("app::Spaceship", "another hint message")
            .function("app::Spaceship", "go_to_mars", "Default hint message");
        let origin = Origin::new("app::Spaceship", "go_to_mars");
        assert_eq!(registry.lookup(Some(&origin)), Some("Default hint message"));
    }

    #[test]
    fn scope_hint_covers_unregistered_functions() {
        let registry = HintRegistry::new().scope("app::Spaceship", "Check the ship");
        let origin = Origin::new("app::Spaceship", "land");
        assert_eq!(registry.lookup(Some(&origin)), Some("Check the ship"));
    }

    #[test]
    fn blank_function_hint_falls_back_to_scope() {
        let registry = HintRegistry::new()
            .scope("app::Spaceship", "Check the ship")
            .function("app::Spaceship", "land", "  ");
        let origin = Origin::new("app::Spaceship", "land");
        assert_eq!(registry.lookup(Some(&origin)), Some("Check the ship"));
    }

    #[test]
    fn unknown_or_missing_origins_resolve_to_none() {
        let registry = HintRegistry::new().scope("app::Spaceship", "Check the ship");
        assert_eq!(registry.lookup(None), None);
        assert_eq!(registry.lookup(Some(&Origin::in_scope("app::Rover"))), None);
    }

    #[test]
    fn location_origins_use_the_file_as_scope() {
        let location = std::panic::Location::caller();
        let origin = Origin::from_location(location);
        assert_eq!(origin.scope(), location.file());
        assert_eq!(origin.function(), None);

        let registry = HintRegistry::new().scope(location.file(), "Read the file header");
        assert_eq!(registry.lookup(Some(&origin)), Some("Read the file header"));
    }

    #[test]
    fn merge_replaces_matching_entries() {
        let mut registry = HintRegistry::new().scope("a", "old");
        registry.merge(HintRegistry::new().scope("a", "new").scope("b", "other"));
        assert_eq!(registry.lookup(Some(&Origin::in_scope("a"))), Some("new"));
        assert_eq!(registry.lookup(Some(&Origin::in_scope("b"))), Some("other"));
    }

    fn scan(paths: &[&str]) -> Option<Origin> {
        let mut scan = FrameScan::default();
        for path in paths {
            scan.visit(path, Some("/work/app/src/ship.rs".to_string()), Some(12));
        }
        scan.found
    }

    #[test]
    fn panicking_frame_is_first_caller_past_the_runtime() {
        let origin = scan(&[
            "backtrace::backtrace::libunwind::trace",
            "take_a_hint::api::hook::install_with_sink::{{closure}}",
            "<alloc::boxed::Box<F,A> as core::ops::function::Fn<Args>>::call",
            "std::panicking::rust_panic_with_hook",
            "std::panicking::begin_panic_handler::{{closure}}",
            "rust_begin_unwind",
            "core::panicking::panic_fmt",
            "core::option::expect_failed",
            "app::ship::Spaceship::go_to_mars",
            "app::main",
        ])
        .expect("frame");
        assert_eq!(origin.scope(), "app::ship::Spaceship");
        assert_eq!(origin.function(), Some("go_to_mars"));
        assert_eq!(origin.line(), Some(12));
    }

    #[test]
    fn v0_symbols_drop_closures_and_generic_args() {
        let origin = scan(&[
            "std::panicking::begin_panic::<&str>",
            "<app::ship::Spaceship>::go_to_mars::{closure#0}",
        ])
        .expect("frame");
        assert_eq!(origin.scope(), "app::ship::Spaceship");
        assert_eq!(origin.function(), Some("go_to_mars"));

        let origin = scan(&["std::panic::panic_any::<u8>", "app::launch::<i32>"]).expect("frame");
        assert_eq!(origin.scope(), "app");
        assert_eq!(origin.function(), Some("launch"));

        let legacy = Origin::from_function_path("app::launch::h0123456789abcdef", "f.rs", 1);
        assert_eq!(legacy.function(), Some("launch"));
    }

    #[test]
    fn stacks_without_a_panic_have_no_panicking_frame() {
        assert_eq!(scan(&["app::ship::Spaceship::go_to_mars", "app::main"]), None);
    }

    #[test]
    fn bare_locations_adopt_frames_from_the_same_file() {
        let frame = scan(&["std::panic::panic_any::<u8>", "app::ship::Spaceship::land"]).expect("frame");

        let located = |file: &str| Origin {
            scope: file.to_string(),
            function: None,
            file: Some(file.to_string()),
            line: Some(40),
        };

        let mut same_file = located("src/ship.rs");
        same_file.adopt(&frame);
        assert_eq!(same_file.scope(), "app::ship::Spaceship");
        assert_eq!(same_file.function(), Some("land"));
        assert_eq!(same_file.line(), Some(40));

        let mut other_file = located("src/rover.rs");
        other_file.adopt(&frame);
        assert_eq!(other_file.function(), None);

        let mut explicit = Origin::new("app::Rover", "drive");
        explicit.adopt(&frame);
        assert_eq!(explicit.function(), Some("drive"));
    }

    #[test]
    fn file_scope_hints_cover_frame_origins() {
        let origin = Origin::new("app::ship::Spaceship", "land")
            .located_at(std::panic::Location::caller());
        let registry = HintRegistry::new().scope(file!(), "Read the file header");
        assert_eq!(registry.lookup(Some(&origin)), Some("Read the file header"));

        let registry = registry.scope("app::ship::Spaceship", "Check the ship");
        assert_eq!(registry.lookup(Some(&origin)), Some("Check the ship"));
    }
}
