//! The binding façade.
//!
//! A [`Parser`] binds request parameters into a [`Bindable`] struct in two
//! passes over the struct's binding table:
//!
//! 1. every bound field is reset to its default value,
//! 2. each binding is filled from its source in discovery order.
//!
//! Binding tables are built once per destination type and cached on the
//! parser. The cache is shared between clones of the same parser.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use http::Method;
use tracing::{debug, trace};

use crate::config::ParserConfig;
use crate::discover::{discover, slot_mut, Binding};
use crate::error::BindError;
use crate::form::{read_form, DEFAULT_MAX_MEMORY};
use crate::query::read_query;
use crate::tag::{tag_name_resolver, SourceKind, TagResolver, DEFAULT_TAG_NAME};
use crate::{BindRequest, Bindable, Values};

/// Looks up a path parameter by name.
///
/// Returning `None` or an empty string leaves the field at its default.
pub type PathParamFn = Arc<dyn Fn(&BindRequest, &str) -> Option<String> + Send + Sync>;

/// Picks the value of a form parameter from the parsed form.
///
/// Returning `None` or an empty string leaves the field at its default.
pub type FormParamFn = Arc<dyn Fn(&Values, &str) -> Option<String> + Send + Sync>;

/// Returns the [`FormParamFn`] used by default: the first value of the name.
#[must_use]
pub fn first_form_value() -> FormParamFn {
    Arc::new(|values: &Values, name: &str| values.get(name).map(str::to_string))
}

/// Binds path, query and form parameters into tagged structs.
///
/// # Example
///
/// ```rust
/// use parambind::{Bindable, BindRequest, Parser};
///
/// #[derive(Bindable, Default, Debug)]
/// struct Hello {
///     #[param = "query=b"]
///     pub b: bool,
///     #[param = "query=i0"]
///     pub i0: i16,
///     #[param = "query=s"]
///     pub s: String,
/// }
///
/// let request = BindRequest::builder()
///     .uri("/hello?b=true&i0=-32768&s=hello")
///     .build();
///
/// let hello: Hello = Parser::new().bind(&request).unwrap();
/// assert!(hello.b);
/// assert_eq!(hello.i0, -32768);
/// assert_eq!(hello.s, "hello");
/// ```
#[derive(Clone)]
pub struct Parser {
    tag_resolver: TagResolver,
    path_param_fn: Option<PathParamFn>,
    form_param_fn: FormParamFn,
    max_memory: u64,
    tables: Arc<DashMap<TypeId, Arc<[Binding]>>>,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            tag_resolver: tag_name_resolver(DEFAULT_TAG_NAME),
            path_param_fn: None,
            form_param_fn: first_form_value(),
            max_memory: DEFAULT_MAX_MEMORY,
            tables: Arc::default(),
        }
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("path_param_fn", &self.path_param_fn.is_some())
            .field("max_memory", &self.max_memory)
            .field("cached_types", &self.tables.len())
            .finish_non_exhaustive()
    }
}

impl Parser {
    /// Creates a parser reacting to `#[param = "..."]` tags, without a path
    /// parameter lookup.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser from configuration.
    #[must_use]
    pub fn from_config(config: &ParserConfig) -> Self {
        Self::new()
            .with_tag_resolver(tag_name_resolver(config.tag_name.as_str()))
            .with_max_memory(config.max_memory)
    }

    /// Sets the path parameter lookup.
    #[must_use]
    pub fn with_path_param_fn(mut self, path_param_fn: PathParamFn) -> Self {
        self.path_param_fn = Some(path_param_fn);
        self
    }

    /// Sets the form parameter lookup.
    #[must_use]
    pub fn with_form_param_fn(mut self, form_param_fn: FormParamFn) -> Self {
        self.form_param_fn = form_param_fn;
        self
    }

    /// Sets the tag resolver and drops cached binding tables.
    #[must_use]
    pub fn with_tag_resolver(mut self, tag_resolver: TagResolver) -> Self {
        self.tag_resolver = tag_resolver;
        self.tables = Arc::default();
        self
    }

    /// Reacts to tags stored under `tag_name` instead of `param`.
    #[must_use]
    pub fn with_tag_name(self, tag_name: impl Into<String>) -> Self {
        self.with_tag_resolver(tag_name_resolver(tag_name))
    }

    /// Sets the size limit for multipart form bodies.
    #[must_use]
    pub fn with_max_memory(mut self, max_memory: u64) -> Self {
        self.max_memory = max_memory;
        self
    }

    /// Returns the size limit for multipart form bodies.
    #[must_use]
    pub fn max_memory(&self) -> u64 {
        self.max_memory
    }

    /// Returns the binding table of `T`, building and caching it on first use.
    pub fn bindings<T: Bindable>(&self) -> Arc<[Binding]> {
        let key = TypeId::of::<T>();
        if let Some(table) = self.tables.get(&key) {
            return Arc::clone(table.value());
        }

        let table: Arc<[Binding]> = discover::<T>(&self.tag_resolver).into();
        debug!(
            destination = T::shape().name(),
            bindings = table.len(),
            multi_valued = table.iter().filter(|b| b.kind().is_multi_valued()).count(),
            "built binding table"
        );
        Arc::clone(self.tables.entry(key).or_insert(table).value())
    }

    /// Binds request parameters into `dest`.
    ///
    /// Every bound field is reset to its default before any source is read,
    /// so values already in `dest` never survive. A field tagged for several
    /// sources is filled from path, then form, then query; the last source
    /// supplying a value wins.
    ///
    /// # Errors
    ///
    /// Returns the first [`BindError`] encountered; `dest` may then be
    /// partially filled.
    pub fn parse<T: Bindable>(&self, request: &BindRequest, dest: &mut T) -> Result<(), BindError> {
        let bindings = self.bindings::<T>();

        for binding in bindings.iter() {
            slot_mut(dest, binding)?.reset();
        }

        let mut sources = Sources::new(request, self.max_memory);
        for binding in bindings.iter() {
            match binding.source() {
                SourceKind::Path => self.bind_path(request, dest, binding)?,
                SourceKind::Form => self.bind_form(request, &mut sources, dest, binding)?,
                SourceKind::Query => Self::bind_query(&mut sources, dest, binding)?,
            }
        }
        Ok(())
    }

    /// Binds request parameters into a default-constructed `T`.
    ///
    /// # Errors
    ///
    /// Returns the first [`BindError`] encountered.
    pub fn bind<T: Bindable + Default>(&self, request: &BindRequest) -> Result<T, BindError> {
        let mut dest = T::default();
        self.parse(request, &mut dest)?;
        Ok(dest)
    }

    fn bind_path<T: Bindable>(
        &self,
        request: &BindRequest,
        dest: &mut T,
        binding: &Binding,
    ) -> Result<(), BindError> {
        let name = binding.name();
        let lookup = self
            .path_param_fn
            .as_ref()
            .ok_or_else(|| BindError::PathLookupMissing {
                name: name.to_string(),
            })?;

        match lookup(request, name) {
            Some(value) if !value.is_empty() => bind_text(dest, binding, &value),
            _ => Ok(()),
        }
    }

    fn bind_form<T: Bindable>(
        &self,
        request: &BindRequest,
        sources: &mut Sources<'_>,
        dest: &mut T,
        binding: &Binding,
    ) -> Result<(), BindError> {
        let name = binding.name();
        let method = request.method();
        if method != Method::POST && method != Method::PUT && method != Method::PATCH {
            return Err(BindError::FormMethodNotAllowed {
                name: name.to_string(),
                method: method.clone(),
            });
        }

        let form = sources.form()?;
        match (self.form_param_fn)(form, name) {
            Some(value) if !value.is_empty() => bind_text(dest, binding, &value),
            _ => Ok(()),
        }
    }

    fn bind_query<T: Bindable>(
        sources: &mut Sources<'_>,
        dest: &mut T,
        binding: &Binding,
    ) -> Result<(), BindError> {
        let values = sources.query()?.get_all(binding.name());
        if values.is_empty() {
            return Ok(());
        }

        slot_mut(dest, binding)?
            .bind_values(values)
            .map_err(|e| BindError::coerce(binding.source(), binding.name(), e))?;
        trace!(
            source = %binding.source(),
            name = binding.name(),
            field = binding.field(),
            kind = %binding.kind(),
            count = values.len(),
            "bound parameter"
        );
        Ok(())
    }
}

fn bind_text<T: Bindable>(dest: &mut T, binding: &Binding, value: &str) -> Result<(), BindError> {
    slot_mut(dest, binding)?
        .bind_text(value)
        .map_err(|e| BindError::coerce(binding.source(), binding.name(), e))?;
    trace!(
        source = %binding.source(),
        name = binding.name(),
        field = binding.field(),
        kind = %binding.kind(),
        "bound parameter"
    );
    Ok(())
}

/// Query and form values of one request, each parsed at most once.
struct Sources<'r> {
    request: &'r BindRequest,
    max_memory: u64,
    query: Option<Values>,
    form: Option<Values>,
}

impl<'r> Sources<'r> {
    fn new(request: &'r BindRequest, max_memory: u64) -> Self {
        Self {
            request,
            max_memory,
            query: None,
            form: None,
        }
    }

    fn query(&mut self) -> Result<&Values, BindError> {
        let values = match self.query.take() {
            Some(values) => values,
            None => read_query(self.request)?,
        };
        Ok(self.query.insert(values))
    }

    fn form(&mut self) -> Result<&Values, BindError> {
        let values = match self.form.take() {
            Some(values) => values,
            None => read_form(self.request, self.max_memory)?,
        };
        Ok(self.form.insert(values))
    }
}
