//! Runtime reflection engine
//!
//! Types are registered explicitly into a [`TypeRegistry`], which owns a
//! graph of descriptors: base and conversion edges, constructors, an
//! optional destructor, data members, member functions and key/value
//! properties. Erased instances travel as [`AnyValue`] (owning) or
//! [`AnyHandle`] (non-owning), and every member lookup is
//! inheritance-aware with local declarations shadowing inherited ones.
//!
//! Each registry is a self-contained context; nothing is global. Code
//! that wants a different reflection world simply takes a different
//! `&TypeRegistry`.
//!
//! ```
//! use mirror_core::{AnyValue, CtorNode, DataNode, TypeDesc, TypeTraits};
//!
//! #[derive(Clone, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! let mut registry = mirror_core::create_standard_registry()?;
//! let i32_key = registry.key_of::<i32>().unwrap();
//! let point = registry
//!     .register_eq::<Point>(TypeDesc::named("Point").with_traits(TypeTraits::class()))?;
//! registry.link_ctor(CtorNode::binary::<Point, i32, i32>(
//!     point,
//!     [i32_key, i32_key],
//!     |x, y| Point { x, y },
//! ))?;
//! registry.link_data(DataNode::field::<Point, i32>(
//!     "x",
//!     point,
//!     i32_key,
//!     |p| &p.x,
//!     |p, v| p.x = v,
//! ))?;
//!
//! let info = registry.resolve::<Point>().unwrap();
//! let mut value = info.construct(&[
//!     AnyValue::new(&registry, 1i32),
//!     AnyValue::new(&registry, 2i32),
//! ]);
//! assert_eq!(value.try_cast::<Point>(&registry).map(|p| p.x), Some(1));
//!
//! let x = info.data("x").unwrap();
//! assert!(x.set(value.as_handle(), AnyValue::new(&registry, 5i32)));
//! assert_eq!(value.try_cast::<Point>(&registry).map(|p| p.x), Some(5));
//! # Ok::<(), mirror_core::ReflectError>(())
//! ```

#![warn(missing_docs)]

pub mod any;
pub mod error;
pub mod handle;
pub mod ident;
pub mod info;
pub mod node;
pub mod registry;
mod traverse;

pub use any::AnyValue;
pub use error::ReflectError;
pub use handle::AnyHandle;
pub use ident::Ident;
pub use info::{
    BaseInfo, ConvInfo, CtorInfo, DataInfo, DtorInfo, FuncInfo, PropInfo, TypeInfo,
};
pub use node::{
    BaseNode, ConvNode, CtorNode, DataNode, DtorNode, FuncNode, PropNode, TypeDesc, TypeKey,
    TypeTraits,
};
pub use registry::{create_standard_registry, TypeRegistry};
