//! # nglite
//!
//! A minimal client-side application runtime: a name-based dependency
//! injection registry and a tree of reactive scopes with dirty-checking change
//! detection.
//!
//! ## Features
//!
//! - **Name-based injection**: factories declare their dependencies by name and
//!   receive them in declaration order
//! - **Singleton cache**: every provider runs at most once per registry
//! - **Provider kinds**: services, directives and controllers share one
//!   catalogue, kept apart by name suffix
//! - **Scope inheritance**: child scopes read through to their ancestors and
//!   write locally
//! - **Bounded digest**: watchers re-run to a fixed point, with a configurable
//!   pass limit instead of looping forever
//! - **Expressions**: a small evaluator for watch and binding expressions
//!
//! ## Quick Start
//!
//! ```rust
//! use nglite::{Factory, Locals, Registry, Value};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let registry = Registry::new();
//! registry.register_controller("Counter", Factory::inject(["$scope"], |args| {
//!     let scope = args.scope(0)?;
//!     scope.set("count", 0);
//!     scope.set("increment", Value::function(|scope, _| {
//!         let next = scope.get("count").as_f64().unwrap_or(0.0) + 1.0;
//!         scope.set("count", next);
//!         Ok(Value::Undefined)
//!     }));
//!     Ok(())
//! }));
//!
//! let scope = registry.root_scope().new_child();
//! registry.instantiate_controller("Counter", &scope).unwrap();
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = seen.clone();
//! scope.watch("count", move |value, _| {
//!     sink.borrow_mut().push(value.clone());
//!     Ok(())
//! }).unwrap();
//!
//! scope.eval("increment()").unwrap();
//! scope.digest().unwrap();
//! assert_eq!(*seen.borrow(), vec![Value::from(1)]);
//! ```
//!
//! ## Binding markup
//!
//! ```rust
//! use nglite::{BuiltinDirectives, Compiler, Element, Registry};
//!
//! let registry = Registry::new();
//! registry.add_module(BuiltinDirectives).unwrap();
//!
//! let input = Element::new("input").with_attribute("ngl-model", "name");
//! let label = Element::new("span").with_attribute("ngl-bind", "name");
//! let page = Element::new("main").with_child(input.clone()).with_child(label.clone());
//!
//! Compiler::new(&registry).bootstrap(&page).unwrap();
//! input.type_text("Ada").unwrap();
//! assert_eq!(label.text(), "Ada");
//! ```

pub mod compiler;
pub mod config;
pub mod descriptors;
pub mod equality;
pub mod error;
pub mod expr;
pub mod key;
pub mod observer;
pub mod registration;
pub mod registry;
pub mod scope;
pub mod traits;
pub mod value;

mod internal;

pub use compiler::{BuiltinDirectives, Compiler, DirectiveDefinition, Element};
pub use config::{ConfigSource, EnvironmentConfigSource, EvalMode, MapConfigSource, RuntimeConfig};
pub use descriptors::ProviderDescriptor;
pub use error::{EvalError, RtError, RtResult};
pub use expr::Expression;
pub use key::ProviderKind;
pub use observer::{MetricsObserver, RuntimeObserver, TracingObserver};
pub use registration::{AnyRc, Args, Factory};
pub use registry::{Locals, Module, Registry, WeakRegistry};
pub use scope::{DigestSummary, Scope, ScopeId, WeakScope};
pub use traits::{Resolver, ResolverCore};
pub use value::{Function, Value};
