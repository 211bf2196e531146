//! Extension registry: the filters, functions, tests, operators, globals
//! and tags templates can use.
//!
//! [`ExtensionRegistry::new`] registers the built-ins. Host modules add
//! their own entries through [`ExtensionContributor`]; a later entry with
//! the same name replaces the earlier one. Listings are ordered by name.
//!
//! ```
//! use std::sync::Arc;
//! use themeweave::extension::ExtensionRegistry;
//! use themeweave::host::NullHost;
//!
//! let registry = ExtensionRegistry::new(Arc::new(NullHost), None);
//! let out = registry
//!     .call_filter("ucfirst", &serde_json::json!("hello"), &Default::default())
//!     .unwrap();
//! assert_eq!(out, serde_json::json!("Hello"));
//! ```

pub mod args;
pub mod filters;
pub mod functions;
pub mod operators;
pub mod tags;
pub mod testers;

pub use operators::{default_operators, Arity, Associativity, OperatorDescriptor, OperatorNode};
pub use tags::{SwitchTag, TagFrame, TagHandler, TagScope, WithTag};

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use tera::{Tera, Value};

use crate::host::HostServices;

/// A filter: piped value plus keyword arguments.
pub type FilterFn = Arc<dyn Fn(&Value, &HashMap<String, Value>) -> tera::Result<Value> + Send + Sync>;

/// A function: keyword arguments only.
pub type FunctionFn = Arc<dyn Fn(&HashMap<String, Value>) -> tera::Result<Value> + Send + Sync>;

/// A test: the tested value (if defined) plus positional arguments.
pub type TestFn = Arc<dyn Fn(Option<&Value>, &[Value]) -> tera::Result<bool> + Send + Sync>;

type BuiltinFilter = fn(&ExtensionContext, &Value, &HashMap<String, Value>) -> tera::Result<Value>;
type BuiltinFunction = fn(&ExtensionContext, &HashMap<String, Value>) -> tera::Result<Value>;

/// What built-in filters and functions can see.
#[derive(Clone)]
pub struct ExtensionContext {
    pub host: Arc<dyn HostServices>,
    /// Active theme name.
    pub theme: Option<String>,
}

impl ExtensionContext {
    pub fn new(host: Arc<dyn HostServices>, theme: Option<String>) -> Self {
        Self { host, theme }
    }
}

impl fmt::Debug for ExtensionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionContext")
            .field("theme", &self.theme)
            .finish_non_exhaustive()
    }
}

/// A host module adding entries to the registry.
pub trait ExtensionContributor {
    /// Name shown in listings.
    fn name(&self) -> &str;

    fn contribute(&self, registry: &mut ExtensionRegistry);
}

/// Everything templates can call, keyed by name.
#[derive(Clone, Default)]
pub struct ExtensionRegistry {
    filters: BTreeMap<String, FilterFn>,
    functions: BTreeMap<String, FunctionFn>,
    tests: BTreeMap<String, TestFn>,
    operators: Vec<OperatorDescriptor>,
    globals: BTreeMap<String, Value>,
    tags: Vec<Arc<dyn TagHandler>>,
    contributors: Vec<String>,
}

const BUILTIN_FILTERS: &[(&str, BuiltinFilter)] = &[
    ("size", filters::size),
    ("plural", filters::plural),
    ("t", filters::t),
    ("attributes", filters::attributes),
    ("check_plain", filters::check_plain),
    ("ucfirst", filters::ucfirst),
    ("url", filters::url),
    ("strreplace", filters::strreplace),
    ("defaults", filters::defaults),
    ("wrap", filters::wrap),
    ("interval", filters::interval),
    ("format_date", filters::format_date),
    ("truncate", filters::truncate),
    ("striphashes", filters::striphashes),
    ("without", filters::without),
];

const BUILTIN_FUNCTIONS: &[(&str, BuiltinFunction)] = &[
    ("theme_get_setting", functions::theme_get_setting),
    ("module_exists", functions::module_exists),
    ("classname", functions::classname),
    ("variable_get", functions::variable_get),
    ("array_search", functions::array_search),
    ("current_path", functions::current_path),
    ("dump", functions::dump),
    ("render", functions::render),
    ("hide", functions::hide),
    ("url", functions::url),
    ("machine_name", functions::machine_name),
    ("viewblock", functions::viewblock),
    ("image_url", functions::image_url),
    ("file_url", functions::file_url),
    ("image_size", functions::image_size),
    ("get_form_errors", functions::get_form_errors),
    ("children", functions::children),
    ("theme_path", functions::theme_path),
];

impl ExtensionRegistry {
    /// A registry holding the built-in extensions bound to `host`.
    pub fn new(host: Arc<dyn HostServices>, theme: Option<String>) -> Self {
        let ctx = ExtensionContext::new(host, theme);
        let mut registry = Self::empty();

        for (name, filter) in BUILTIN_FILTERS {
            registry.add_filter(*name, bind_filter(&ctx, *filter));
        }
        for (name, function) in BUILTIN_FUNCTIONS {
            registry.add_function(*name, bind_function(&ctx, *function));
        }

        registry.add_test("property", Arc::new(testers::property));
        registry.add_test("array", Arc::new(testers::array));
        registry.add_test("scalar", Arc::new(testers::scalar));
        registry.add_test("number", Arc::new(testers::number));
        registry.add_test("string", Arc::new(testers::string));

        for operator in default_operators() {
            registry.add_operator(operator);
        }

        registry.add_tag(Arc::new(WithTag));
        registry.add_tag(Arc::new(SwitchTag));

        registry.add_global("base_path", Value::String(ctx.host.base_path()));

        registry
    }

    /// A registry with nothing registered.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn add_filter(&mut self, name: impl Into<String>, filter: FilterFn) {
        self.filters.insert(name.into(), filter);
    }

    pub fn add_function(&mut self, name: impl Into<String>, function: FunctionFn) {
        self.functions.insert(name.into(), function);
    }

    pub fn add_test(&mut self, name: impl Into<String>, test: TestFn) {
        self.tests.insert(name.into(), test);
    }

    /// Add an operator, replacing any with the same symbol.
    pub fn add_operator(&mut self, operator: OperatorDescriptor) {
        self.operators.retain(|o| o.symbol != operator.symbol);
        self.operators.push(operator);
        self.operators.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    }

    pub fn add_global(&mut self, name: impl Into<String>, value: Value) {
        self.globals.insert(name.into(), value);
    }

    /// Add a tag handler. Keywords it claims are taken from any handler
    /// registered earlier.
    pub fn add_tag(&mut self, tag: Arc<dyn TagHandler>) {
        self.tags.retain(|existing| {
            existing.name() != tag.name()
                && !existing.keywords().iter().any(|k| tag.keywords().contains(k))
        });
        self.tags.push(tag);
        self.tags.sort_by(|a, b| a.name().cmp(b.name()));
    }

    /// Let a host module add its entries.
    pub fn contribute(&mut self, contributor: &dyn ExtensionContributor) {
        tracing::debug!(contributor = contributor.name(), "Adding template extensions");
        contributor.contribute(self);
        self.contributors.push(contributor.name().to_string());
    }

    pub fn filter(&self, name: &str) -> Option<&FilterFn> {
        self.filters.get(name)
    }

    pub fn function(&self, name: &str) -> Option<&FunctionFn> {
        self.functions.get(name)
    }

    pub fn test(&self, name: &str) -> Option<&TestFn> {
        self.tests.get(name)
    }

    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.keys().map(String::as_str).collect()
    }

    pub fn function_names(&self) -> Vec<&str> {
        self.functions.keys().map(String::as_str).collect()
    }

    pub fn test_names(&self) -> Vec<&str> {
        self.tests.keys().map(String::as_str).collect()
    }

    /// Operators ordered by symbol.
    pub fn operators(&self) -> &[OperatorDescriptor] {
        &self.operators
    }

    pub fn globals(&self) -> &BTreeMap<String, Value> {
        &self.globals
    }

    /// Tag handlers ordered by name.
    pub fn tags(&self) -> &[Arc<dyn TagHandler>] {
        &self.tags
    }

    /// The handler claiming `keyword`, if any.
    pub fn tag_for(&self, keyword: &str) -> Option<&Arc<dyn TagHandler>> {
        self.tags.iter().find(|t| t.keywords().contains(&keyword))
    }

    /// Names of the contributors applied so far, in order.
    pub fn contributors(&self) -> &[String] {
        &self.contributors
    }

    pub fn call_filter(
        &self,
        name: &str,
        value: &Value,
        args: &HashMap<String, Value>,
    ) -> tera::Result<Value> {
        let filter = self
            .filter(name)
            .ok_or_else(|| tera::Error::msg(format!("Filter '{}' not found", name)))?;
        filter(value, args)
    }

    pub fn call_function(&self, name: &str, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let function = self
            .function(name)
            .ok_or_else(|| tera::Error::msg(format!("Function '{}' not found", name)))?;
        function(args)
    }

    pub fn call_test(&self, name: &str, value: Option<&Value>, args: &[Value]) -> tera::Result<bool> {
        let test = self
            .test(name)
            .ok_or_else(|| tera::Error::msg(format!("Test '{}' not found", name)))?;
        test(value, args)
    }

    /// Register filters, functions and tests with a Tera instance.
    ///
    /// Entries override Tera built-ins of the same name.
    pub fn install(&self, tera: &mut Tera) {
        for (name, filter) in &self.filters {
            let filter = Arc::clone(filter);
            tera.register_filter(name, move |value: &Value, args: &HashMap<String, Value>| {
                filter(value, args)
            });
        }
        for (name, function) in &self.functions {
            let function = Arc::clone(function);
            tera.register_function(name, move |args: &HashMap<String, Value>| function(args));
        }
        for (name, test) in &self.tests {
            let test = Arc::clone(test);
            tera.register_tester(name, move |value: Option<&Value>, args: &[Value]| {
                test(value, args)
            });
        }
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("filters", &self.filter_names())
            .field("functions", &self.function_names())
            .field("tests", &self.test_names())
            .field("operators", &self.operators)
            .field("globals", &self.globals)
            .field("tags", &self.tags)
            .field("contributors", &self.contributors)
            .finish()
    }
}

fn bind_filter(ctx: &ExtensionContext, filter: BuiltinFilter) -> FilterFn {
    let ctx = ctx.clone();
    Arc::new(move |value: &Value, args: &HashMap<String, Value>| filter(&ctx, value, args))
}

fn bind_function(ctx: &ExtensionContext, function: BuiltinFunction) -> FunctionFn {
    let ctx = ctx.clone();
    Arc::new(move |args: &HashMap<String, Value>| function(&ctx, args))
}
