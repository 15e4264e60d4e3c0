//! Lightweight views over the reflection graph
//!
//! Views borrow the registry and hand out query and invocation surfaces
//! without exposing the nodes themselves. All member lookups honor the
//! fixed precedence: locally declared members shadow inherited ones, and
//! base chains are walked depth-first in declaration order.
//!
//! Constructor lookup is the one deliberately local query: `ctor` inspects
//! the type's own constructors only, while `construct` also tries the
//! constructors reachable through base edges.

use crate::any::AnyValue;
use crate::handle::AnyHandle;
use crate::ident::Ident;
use crate::node::{
    BaseNode, ConvNode, CtorNode, DataNode, DtorNode, FuncNode, PropNode, TypeKey, TypeNode,
    TypeTraits,
};
use crate::registry::TypeRegistry;
use crate::traverse;
use std::any::TypeId as StdTypeId;

/// View over one registered type.
#[derive(Clone, Copy)]
pub struct TypeInfo<'r> {
    registry: &'r TypeRegistry,
    key: TypeKey,
    node: &'r TypeNode,
}

impl<'r> TypeInfo<'r> {
    pub(crate) fn new(registry: &'r TypeRegistry, key: TypeKey, node: &'r TypeNode) -> Self {
        TypeInfo {
            registry,
            key,
            node,
        }
    }

    /// Key of the type in its registry.
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Identifier of the type; anonymous for unnamed types.
    pub fn identifier(&self) -> Ident {
        self.node.identifier
    }

    /// Host-language type id the descriptor was registered under.
    pub fn rust_id(&self) -> StdTypeId {
        self.node.rust_id
    }

    /// Classification flags.
    pub fn traits(&self) -> TypeTraits {
        self.node.traits
    }

    /// Number of elements for array types, 0 otherwise.
    pub fn extent(&self) -> usize {
        self.node.extent
    }

    /// Pointee type for pointer types; any other type strips to itself.
    pub fn pointee(&self) -> TypeInfo<'r> {
        self.node
            .pointee
            .and_then(|key| self.registry.info(key))
            .unwrap_or(*self)
    }

    /// Element type for array types; any other type strips to itself.
    pub fn element(&self) -> TypeInfo<'r> {
        self.node
            .element
            .and_then(|key| self.registry.info(key))
            .unwrap_or(*self)
    }

    /// Base edge whose target is the given type, searched transitively.
    pub fn base(&self, target: TypeKey) -> Option<BaseInfo<'r>> {
        let node = traverse::find_first(
            self.registry,
            self.key,
            |n| n.bases.as_slice(),
            &mut |b: &BaseNode| b.target == target,
        )?;
        Some(BaseInfo {
            registry: self.registry,
            node,
        })
    }

    /// Visit every base edge, own ones first.
    pub fn each_base(&self, mut f: impl FnMut(BaseInfo<'r>)) {
        traverse::visit_all(
            self.registry,
            self.key,
            |n| n.bases.as_slice(),
            &mut |node| {
                f(BaseInfo {
                    registry: self.registry,
                    node,
                })
            },
        );
    }

    /// Conversion edge to the given target type, searched transitively.
    pub fn conv(&self, target: TypeKey) -> Option<ConvInfo<'r>> {
        let node = traverse::find_first(
            self.registry,
            self.key,
            |n| n.convs.as_slice(),
            &mut |c: &ConvNode| c.target == target,
        )?;
        Some(ConvInfo {
            registry: self.registry,
            node,
        })
    }

    /// Visit every conversion edge, own ones first.
    pub fn each_conv(&self, mut f: impl FnMut(ConvInfo<'r>)) {
        traverse::visit_all(
            self.registry,
            self.key,
            |n| n.convs.as_slice(),
            &mut |node| {
                f(ConvInfo {
                    registry: self.registry,
                    node,
                })
            },
        );
    }

    /// First locally declared constructor accepting arguments of the given
    /// types, in declaration order.
    ///
    /// An argument type is accepted when it is identical to, derived from
    /// or convertible to the declared one; an earlier constructor matched
    /// through a conversion wins over a later exact match.
    pub fn ctor(&self, args: &[TypeKey]) -> Option<CtorInfo<'r>> {
        let node = self.node.ctors.iter().find(|ctor| {
            ctor.args.len() == args.len()
                && ctor
                    .args
                    .iter()
                    .zip(args)
                    .all(|(&declared, &supplied)| {
                        self.registry.can_cast_or_convert(supplied, declared)
                    })
        })?;
        Some(CtorInfo {
            registry: self.registry,
            node,
        })
    }

    /// Visit the locally declared constructors in declaration order.
    pub fn each_ctor(&self, mut f: impl FnMut(CtorInfo<'r>)) {
        for node in &self.node.ctors {
            f(CtorInfo {
                registry: self.registry,
                node,
            });
        }
    }

    /// The type's destructor, if one is linked.
    pub fn dtor(&self) -> Option<DtorInfo<'r>> {
        Some(DtorInfo {
            node: self.node.dtor.as_ref()?,
        })
    }

    /// Data member by identifier; local members shadow inherited ones.
    pub fn data(&self, identifier: impl Into<Ident>) -> Option<DataInfo<'r>> {
        let identifier = identifier.into();
        let node = traverse::find_first(
            self.registry,
            self.key,
            |n| n.data.as_slice(),
            &mut |d: &DataNode| d.identifier == identifier,
        )?;
        Some(DataInfo {
            registry: self.registry,
            node,
        })
    }

    /// Visit every data member, own ones first.
    pub fn each_data(&self, mut f: impl FnMut(DataInfo<'r>)) {
        traverse::visit_all(
            self.registry,
            self.key,
            |n| n.data.as_slice(),
            &mut |node| {
                f(DataInfo {
                    registry: self.registry,
                    node,
                })
            },
        );
    }

    /// Member function by identifier; local members shadow inherited ones.
    pub fn func(&self, identifier: impl Into<Ident>) -> Option<FuncInfo<'r>> {
        let identifier = identifier.into();
        let node = traverse::find_first(
            self.registry,
            self.key,
            |n| n.funcs.as_slice(),
            &mut |f: &FuncNode| f.identifier == identifier,
        )?;
        Some(FuncInfo {
            registry: self.registry,
            node,
        })
    }

    /// Visit every member function, own ones first.
    pub fn each_func(&self, mut f: impl FnMut(FuncInfo<'r>)) {
        traverse::visit_all(
            self.registry,
            self.key,
            |n| n.funcs.as_slice(),
            &mut |node| {
                f(FuncInfo {
                    registry: self.registry,
                    node,
                })
            },
        );
    }

    /// Property by key; local properties shadow inherited ones.
    pub fn prop(&self, key: &AnyValue) -> Option<PropInfo<'r>> {
        let node = traverse::find_first(
            self.registry,
            self.key,
            |n| n.props.as_slice(),
            &mut |p: &PropNode| p.key == *key,
        )?;
        Some(PropInfo { node })
    }

    /// Visit every property, own ones first.
    pub fn each_prop(&self, mut f: impl FnMut(PropInfo<'r>)) {
        traverse::visit_all(
            self.registry,
            self.key,
            |n| n.props.as_slice(),
            &mut |node| f(PropInfo { node }),
        );
    }

    /// Construct an instance from erased arguments.
    ///
    /// Constructors are tried in declaration order, local ones first and
    /// then those reachable through base edges; the first invocation that
    /// produces a valid value wins. Empty when no constructor accepts the
    /// arguments.
    pub fn construct(&self, args: &[AnyValue]) -> AnyValue {
        let mut result = AnyValue::empty();
        traverse::find_first(
            self.registry,
            self.key,
            |n| n.ctors.as_slice(),
            &mut |ctor: &CtorNode| {
                if ctor.args.len() != args.len() {
                    return false;
                }
                let produced = (ctor.invoke)(self.registry, args);
                if produced.is_valid() {
                    result = produced;
                    true
                } else {
                    false
                }
            },
        );
        result
    }

    /// Run the destructor hook on an instance of exactly this type.
    ///
    /// Reports false for handles of any other type, bases and derived
    /// types included. True when no destructor is linked.
    pub fn destroy(&self, handle: AnyHandle<'_>) -> bool {
        if handle.key() != Some(self.key) || !handle.is_valid() {
            return false;
        }
        match &self.node.dtor {
            Some(dtor) => (dtor.invoke)(handle),
            None => true,
        }
    }
}

impl PartialEq for TypeInfo<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.registry, other.registry) && self.key == other.key
    }
}

impl std::fmt::Debug for TypeInfo<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeInfo")
            .field("key", &self.key)
            .field("identifier", &self.node.identifier)
            .finish()
    }
}

/// View over a base edge.
#[derive(Clone, Copy)]
pub struct BaseInfo<'r> {
    registry: &'r TypeRegistry,
    node: &'r BaseNode,
}

impl<'r> BaseInfo<'r> {
    /// The declaring (derived) type.
    pub fn parent(&self) -> Option<TypeInfo<'r>> {
        self.registry.info(self.node.parent)
    }

    /// The base type the edge points at.
    pub fn target(&self) -> Option<TypeInfo<'r>> {
        self.registry.info(self.node.target)
    }
}

/// View over a conversion edge.
#[derive(Clone, Copy)]
pub struct ConvInfo<'r> {
    registry: &'r TypeRegistry,
    node: &'r ConvNode,
}

impl<'r> ConvInfo<'r> {
    /// The declaring (source) type.
    pub fn parent(&self) -> Option<TypeInfo<'r>> {
        self.registry.info(self.node.parent)
    }

    /// The type the conversion produces.
    pub fn target(&self) -> Option<TypeInfo<'r>> {
        self.registry.info(self.node.target)
    }
}

/// View over a constructor.
#[derive(Clone, Copy)]
pub struct CtorInfo<'r> {
    registry: &'r TypeRegistry,
    node: &'r CtorNode,
}

impl<'r> CtorInfo<'r> {
    /// The constructed type.
    pub fn parent(&self) -> Option<TypeInfo<'r>> {
        self.registry.info(self.node.parent)
    }

    /// Number of declared arguments.
    pub fn arity(&self) -> usize {
        self.node.args.len()
    }

    /// Declared type of the argument at `index`.
    pub fn arg(&self, index: usize) -> Option<TypeInfo<'r>> {
        self.registry.info(*self.node.args.get(index)?)
    }

    /// Invoke the constructor; empty on argument mismatch.
    pub fn invoke(&self, args: &[AnyValue]) -> AnyValue {
        (self.node.invoke)(self.registry, args)
    }

    /// Property by key.
    pub fn prop(&self, key: &AnyValue) -> Option<PropInfo<'r>> {
        let node = self.node.props.iter().find(|p| p.key == *key)?;
        Some(PropInfo { node })
    }

    /// Visit the constructor's properties.
    pub fn each_prop(&self, mut f: impl FnMut(PropInfo<'r>)) {
        for node in &self.node.props {
            f(PropInfo { node });
        }
    }
}

/// View over a destructor.
#[derive(Clone, Copy)]
pub struct DtorInfo<'r> {
    node: &'r DtorNode,
}

impl DtorInfo<'_> {
    /// Run the teardown hook on the given instance.
    ///
    /// Reports false when the handle does not refer to the declaring type.
    pub fn invoke(&self, handle: AnyHandle<'_>) -> bool {
        (self.node.invoke)(handle)
    }
}

/// View over a data member.
#[derive(Clone, Copy)]
pub struct DataInfo<'r> {
    registry: &'r TypeRegistry,
    node: &'r DataNode,
}

impl<'r> DataInfo<'r> {
    /// Identifier of the member.
    pub fn identifier(&self) -> Ident {
        self.node.identifier
    }

    /// The declaring type.
    pub fn parent(&self) -> Option<TypeInfo<'r>> {
        self.registry.info(self.node.parent)
    }

    /// Declared type of the member.
    pub fn ty(&self) -> Option<TypeInfo<'r>> {
        self.registry.info(self.node.ty)
    }

    /// Check whether the member rejects writes.
    pub fn is_const(&self) -> bool {
        self.node.is_const
    }

    /// Check whether the member is accessed without an instance.
    pub fn is_static(&self) -> bool {
        self.node.is_static
    }

    /// Read the member.
    pub fn get(&self, handle: AnyHandle<'_>) -> AnyValue {
        (self.node.get)(self.registry, handle, None)
    }

    /// Read one element of an array member.
    pub fn get_at(&self, handle: AnyHandle<'_>, index: usize) -> AnyValue {
        (self.node.get)(self.registry, handle, Some(index))
    }

    /// Write the member; the value is cast or converted to the declared
    /// type first. Reports false on mismatch or for read-only members.
    pub fn set(&self, handle: AnyHandle<'_>, value: AnyValue) -> bool {
        (self.node.set)(self.registry, handle, None, value)
    }

    /// Write one element of an array member.
    pub fn set_at(&self, handle: AnyHandle<'_>, index: usize, value: AnyValue) -> bool {
        (self.node.set)(self.registry, handle, Some(index), value)
    }

    /// Property by key.
    pub fn prop(&self, key: &AnyValue) -> Option<PropInfo<'r>> {
        let node = self.node.props.iter().find(|p| p.key == *key)?;
        Some(PropInfo { node })
    }

    /// Visit the member's properties.
    pub fn each_prop(&self, mut f: impl FnMut(PropInfo<'r>)) {
        for node in &self.node.props {
            f(PropInfo { node });
        }
    }
}

/// View over a member function.
#[derive(Clone, Copy)]
pub struct FuncInfo<'r> {
    registry: &'r TypeRegistry,
    node: &'r FuncNode,
}

impl<'r> FuncInfo<'r> {
    /// Identifier of the function.
    pub fn identifier(&self) -> Ident {
        self.node.identifier
    }

    /// The declaring type.
    pub fn parent(&self) -> Option<TypeInfo<'r>> {
        self.registry.info(self.node.parent)
    }

    /// Declared return type.
    pub fn ret(&self) -> Option<TypeInfo<'r>> {
        self.registry.info(self.node.ret)
    }

    /// Number of declared arguments.
    pub fn arity(&self) -> usize {
        self.node.args.len()
    }

    /// Declared type of the argument at `index`.
    pub fn arg(&self, index: usize) -> Option<TypeInfo<'r>> {
        self.registry.info(*self.node.args.get(index)?)
    }

    /// Check whether the function leaves the instance untouched.
    pub fn is_const(&self) -> bool {
        self.node.is_const
    }

    /// Check whether the function is invoked without an instance.
    pub fn is_static(&self) -> bool {
        self.node.is_static
    }

    /// Invoke the function. Arguments are cast or converted to the
    /// declared types; empty on mismatch. Static functions ignore the
    /// handle.
    pub fn invoke(&self, handle: AnyHandle<'_>, args: &[AnyValue]) -> AnyValue {
        (self.node.invoke)(self.registry, handle, args)
    }

    /// Property by key.
    pub fn prop(&self, key: &AnyValue) -> Option<PropInfo<'r>> {
        let node = self.node.props.iter().find(|p| p.key == *key)?;
        Some(PropInfo { node })
    }

    /// Visit the function's properties.
    pub fn each_prop(&self, mut f: impl FnMut(PropInfo<'r>)) {
        for node in &self.node.props {
            f(PropInfo { node });
        }
    }
}

/// View over a key/value property.
#[derive(Clone, Copy)]
pub struct PropInfo<'r> {
    node: &'r PropNode,
}

impl<'r> PropInfo<'r> {
    /// The property key.
    pub fn key(&self) -> &'r AnyValue {
        &self.node.key
    }

    /// The property value.
    pub fn value(&self) -> &'r AnyValue {
        &self.node.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{DataNode, FuncNode, TypeDesc};
    use crate::registry::create_standard_registry;

    #[derive(Clone, PartialEq, Debug)]
    struct Point {
        x: i32,
        y: i32,
    }

    fn registry_with_point() -> TypeRegistry {
        let mut registry = create_standard_registry().unwrap();
        let i32_key = registry.key_of::<i32>().unwrap();
        let point = registry
            .register_eq::<Point>(TypeDesc::named("Point").with_traits(TypeTraits::class()))
            .unwrap();

        registry
            .link_ctor(CtorNode::binary::<Point, i32, i32>(
                point,
                [i32_key, i32_key],
                |x, y| Point { x, y },
            ))
            .unwrap();
        registry
            .link_data(DataNode::field::<Point, i32>(
                "x",
                point,
                i32_key,
                |p| &p.x,
                |p, v| p.x = v,
            ))
            .unwrap();
        registry
            .link_data(DataNode::field::<Point, i32>(
                "y",
                point,
                i32_key,
                |p| &p.y,
                |p, v| p.y = v,
            ))
            .unwrap();
        registry
            .link_func(FuncNode::const_method0::<Point, i32>(
                "magnitude2",
                point,
                i32_key,
                |p| p.x * p.x + p.y * p.y,
            ))
            .unwrap();
        registry
    }

    #[test]
    fn test_descriptor_identity() {
        let registry = registry_with_point();
        let a = registry.resolve::<Point>().unwrap();
        let b = registry.by_identifier("Point").unwrap();

        assert_eq!(a, b);
        assert_eq!(a.identifier(), Ident::from_name("Point"));
        assert!(a.traits().is_class);
    }

    #[test]
    fn test_construct_and_access_members() {
        let registry = registry_with_point();
        let point = registry.resolve::<Point>().unwrap();

        let mut value = point.construct(&[
            AnyValue::new(&registry, 3i32),
            AnyValue::new(&registry, 4i32),
        ]);
        assert_eq!(
            value.try_cast::<Point>(&registry),
            Some(&Point { x: 3, y: 4 })
        );

        let x = point.data("x").unwrap();
        assert_eq!(
            x.get(value.as_handle()).try_cast::<i32>(&registry),
            Some(&3)
        );
        assert!(x.set(value.as_handle(), AnyValue::new(&registry, 9i32)));
        assert_eq!(value.try_cast::<Point>(&registry).unwrap().x, 9);
    }

    #[test]
    fn test_setter_converts_argument() {
        let registry = registry_with_point();
        let point = registry.resolve::<Point>().unwrap();
        let mut value = AnyValue::new(&registry, Point { x: 0, y: 0 });

        // i64 narrows to i32 through the registered conversion.
        let y = point.data("y").unwrap();
        assert!(y.set(value.as_handle(), AnyValue::new(&registry, 5i64)));
        assert_eq!(value.try_cast::<Point>(&registry).unwrap().y, 5);

        // No conversion from String.
        assert!(!y.set(
            value.as_handle(),
            AnyValue::new(&registry, String::from("5"))
        ));
    }

    #[test]
    fn test_function_invocation() {
        let registry = registry_with_point();
        let point = registry.resolve::<Point>().unwrap();
        let mut value = AnyValue::new(&registry, Point { x: 3, y: 4 });

        let func = point.func("magnitude2").unwrap();
        assert!(func.is_const());
        assert_eq!(func.arity(), 0);
        assert_eq!(func.ret(), registry.resolve::<i32>());

        let result = func.invoke(value.as_handle(), &[]);
        assert_eq!(result.try_cast::<i32>(&registry), Some(&25));

        // Wrong arity misses.
        assert!(!func
            .invoke(value.as_handle(), &[AnyValue::new(&registry, 1i32)])
            .is_valid());
    }

    #[test]
    fn test_ctor_lookup_accepts_convertible_arguments() {
        let registry = registry_with_point();
        let point = registry.resolve::<Point>().unwrap();
        let i32_key = registry.key_of::<i32>().unwrap();
        let i64_key = registry.key_of::<i64>().unwrap();
        let f64_key = registry.key_of::<f64>().unwrap();

        assert!(point.ctor(&[i32_key, i32_key]).is_some());
        // i64 converts to i32, so the candidate still matches.
        assert!(point.ctor(&[i64_key, i32_key]).is_some());
        assert!(point.ctor(&[f64_key, i32_key]).is_none());
        assert!(point.ctor(&[i32_key]).is_none());
    }

    #[test]
    fn test_destroy_requires_exact_type() {
        let registry = registry_with_point();
        let point = registry.resolve::<Point>().unwrap();

        let mut value = AnyValue::new(&registry, Point { x: 1, y: 2 });
        assert!(point.destroy(value.as_handle()));

        let mut wrong = AnyValue::new(&registry, 5i32);
        assert!(!point.destroy(wrong.as_handle()));
        assert!(!point.destroy(AnyHandle::default()));
    }

    #[test]
    fn test_type_properties() {
        let mut registry = registry_with_point();
        let point_key = registry.key_of::<Point>().unwrap();
        registry
            .link_type_prop(
                point_key,
                PropNode::new(
                    AnyValue::new(&registry, String::from("category")),
                    AnyValue::new(&registry, String::from("geometry")),
                ),
            )
            .unwrap();

        let point = registry.resolve::<Point>().unwrap();
        let key = AnyValue::new(&registry, String::from("category"));
        let prop = point.prop(&key).unwrap();
        assert_eq!(
            prop.value().try_cast::<String>(&registry).map(String::as_str),
            Some("geometry")
        );

        let missing = AnyValue::new(&registry, String::from("absent"));
        assert!(point.prop(&missing).is_none());
    }
}
