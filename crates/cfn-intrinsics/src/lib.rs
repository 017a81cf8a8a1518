//! # cfn-intrinsics - local expansion of CloudFormation intrinsic functions
//!
//! Resolves whatever can be known before deployment (pseudo-parameters, parameter values, mappings, conditions and
//! resource attributes that were handed in) and leaves every other intrinsic in place for CloudFormation.
//!
//! ## Introduction for developers
//!
//! Read this to understand how `cfn-intrinsics` works internally.
//!
//! ### Terms
//!
//! - an `intrinsic` is an object with exactly one key, where the key is `Ref`, `Condition` or starts with `Fn::`
//! - its single value is the `argument`
//! - `preserving` an intrinsic means emitting `{name: argument}` again, with the argument already resolved
//! - `AWS::NoValue` is not a value: a `{"Ref": "AWS::NoValue"}` removes the slot it occupies in its parent
//!
//! ```yaml
//! Resources:
//!   Topic:
//!     Type: AWS::SNS::Topic
//!     Properties:
//!       TopicName: !Sub "${AWS::StackName}-topic"   # short form, becomes {"Fn::Sub": ...}
//!       KmsMasterKeyId: !Ref AWS::NoValue            # removed from Properties
//! ```
//!
//! ### Loading templates
//!
//! A template is parsed as YAML (JSON is a subset) and converted into a [value::Value] tree by
//! [template::Template::load_file]. YAML short-form tags are turned into their long form on the way.
//!
//! ### Context
//!
//! A [context::ResolveContext] holds the tables a single run consults: pseudo-parameters (seeded with
//! [context::NO_VALUE] and a fixed local identity), parameters (seeded with declared `Default`s), known resource
//! attributes and condition outcomes.
//!
//! ### Actions
//!
//! Each intrinsic function is implemented by an [actions::Action] stored in an [actions::Registry] under its name.
//! An action only ever sees an argument that has already been resolved. It either returns a value or preserves
//! itself.
//!
//! ### Resolving
//!
//! [resolver::Resolver] walks the tree bottom-up. Before an action runs the resolver
//! - renames logical IDs in the argument, once, before the argument itself is resolved
//! - keeps placeholders (and `Fn::ImportValue`/`Fn::GetAZs`) untouched
//! - records `Ref`/`Fn::GetAtt` between resources in a [dependency::DependencyTracker]
//!
//! Errors are reported with the location of the offending node, e.g.
//! `Resources.MyFunction.Properties.Foo: Ref: argument must be a string, found integer`.
//!
//! ### Output
//!
//! The resolved [value::Value] is serialized via [serde]. The tracker orders resources so that dependencies come first
//! and reports cycles.
//!
pub mod template;

pub mod actions;
pub mod context;
pub mod dependency;
pub mod error;
pub mod resolver;
mod util;
pub mod value;
mod visit;

pub use actions::{Action, Registry};
pub use context::ResolveContext;
pub use dependency::{DependencyError, DependencyTracker};
pub use error::{IntrinsicError, Path};
pub use resolver::Resolver;
pub use template::Template;
pub use value::{Resolution, Value};
