//! Type registry: the owner of the reflection graph
//!
//! A registry is a self-contained reflection context. Types are registered
//! explicitly and keyed on their host `TypeId`; registration is
//! first-wins, so re-registering an attached type hands back the existing
//! key untouched. Descriptors live in an arena and their keys stay stable
//! across unregistration, which detaches a descriptor without invalidating
//! keys already handed out.
//!
//! Two registries never share state; "switching context" is passing a
//! different `&TypeRegistry` around.

use crate::error::ReflectError;
use crate::ident::Ident;
use crate::info::TypeInfo;
use crate::node::{
    identity_compare, value_compare, BaseNode, CompareFn, ConvNode, CtorNode, DataNode, DtorNode,
    FuncNode, PropNode, TypeDesc, TypeKey, TypeNode, TypeTraits,
};
use crate::traverse;
use rustc_hash::FxHashMap;
use std::any::TypeId as StdTypeId;

/// Registry of reflected types; an isolated reflection context.
#[derive(Default)]
pub struct TypeRegistry {
    types: Vec<TypeNode>,
    by_rust_id: FxHashMap<StdTypeId, TypeKey>,
    by_ident: FxHashMap<Ident, TypeKey>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        TypeRegistry::default()
    }

    /// Register `T` under the given descriptor, comparing instances by
    /// pointer identity.
    ///
    /// First registration wins: if `T` is already attached the existing key
    /// is returned and the descriptor argument is ignored. Re-registering a
    /// previously unregistered type re-attaches it under its old key.
    pub fn register<T: 'static>(&mut self, desc: TypeDesc) -> Result<TypeKey, ReflectError> {
        self.register_impl(StdTypeId::of::<T>(), desc, identity_compare)
    }

    /// Register `T` under the given descriptor, comparing instances through
    /// the type's own equality.
    pub fn register_eq<T: 'static + PartialEq>(
        &mut self,
        desc: TypeDesc,
    ) -> Result<TypeKey, ReflectError> {
        self.register_impl(StdTypeId::of::<T>(), desc, value_compare::<T>)
    }

    fn register_impl(
        &mut self,
        rust_id: StdTypeId,
        desc: TypeDesc,
        compare: CompareFn,
    ) -> Result<TypeKey, ReflectError> {
        if let Some(&key) = self.by_rust_id.get(&rust_id) {
            let node = &self.types[key.0 as usize];
            if node.registered {
                return Ok(key);
            }
            self.claim_identifier(desc.identifier, key)?;
            self.types[key.0 as usize] = TypeNode::new(rust_id, desc, compare);
            return Ok(key);
        }

        let key = TypeKey(self.types.len() as u32);
        self.claim_identifier(desc.identifier, key)?;
        self.types.push(TypeNode::new(rust_id, desc, compare));
        self.by_rust_id.insert(rust_id, key);
        Ok(key)
    }

    fn claim_identifier(&mut self, identifier: Ident, key: TypeKey) -> Result<(), ReflectError> {
        if identifier.is_anonymous() {
            return Ok(());
        }
        if self.by_ident.contains_key(&identifier) {
            return Err(ReflectError::DuplicateTypeIdentifier { identifier });
        }
        self.by_ident.insert(identifier, key);
        Ok(())
    }

    /// Detach `T` from the registry.
    ///
    /// The descriptor's lists are discarded and its identifier is released,
    /// but its key stays reserved: a later registration of `T` re-attaches
    /// under the same key. Returns false if `T` was not attached.
    pub fn unregister<T: 'static>(&mut self) -> bool {
        let Some(&key) = self.by_rust_id.get(&StdTypeId::of::<T>()) else {
            return false;
        };
        let node = &mut self.types[key.0 as usize];
        if !node.registered {
            return false;
        }
        self.by_ident.remove(&node.identifier);
        node.detach();
        true
    }

    /// Detach every type, resetting the context while keeping key
    /// reservations intact.
    pub fn clear(&mut self) {
        for node in &mut self.types {
            node.detach();
        }
        self.by_ident.clear();
    }

    /// Key of `T`, if attached.
    pub fn key_of<T: 'static>(&self) -> Option<TypeKey> {
        let &key = self.by_rust_id.get(&StdTypeId::of::<T>())?;
        self.types[key.0 as usize].registered.then_some(key)
    }

    /// Descriptor view of `T`, if attached.
    pub fn resolve<T: 'static>(&self) -> Option<TypeInfo<'_>> {
        self.info(self.key_of::<T>()?)
    }

    /// Descriptor view for a key, if the key refers to an attached type.
    pub fn info(&self, key: TypeKey) -> Option<TypeInfo<'_>> {
        let node = self.node(key)?;
        node.registered.then(|| TypeInfo::new(self, key, node))
    }

    /// Descriptor view looked up by identifier.
    pub fn by_identifier(&self, identifier: impl Into<Ident>) -> Option<TypeInfo<'_>> {
        self.info(*self.by_ident.get(&identifier.into())?)
    }

    /// Iterate over every attached type.
    pub fn types(&self) -> impl Iterator<Item = TypeInfo<'_>> {
        self.types
            .iter()
            .enumerate()
            .filter(|(_, node)| node.registered)
            .map(|(index, node)| TypeInfo::new(self, TypeKey(index as u32), node))
    }

    /// Number of attached types.
    pub fn len(&self) -> usize {
        self.types.iter().filter(|node| node.registered).count()
    }

    /// Check whether no type is attached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn node(&self, key: TypeKey) -> Option<&TypeNode> {
        self.types.get(key.0 as usize)
    }

    fn attached_mut(&mut self, key: TypeKey) -> Result<&mut TypeNode, ReflectError> {
        match self.types.get_mut(key.0 as usize) {
            Some(node) if node.registered => Ok(node),
            _ => Err(ReflectError::DetachedType { key: key.0 }),
        }
    }

    /// Link a base edge to its declaring type.
    pub fn link_base(&mut self, base: BaseNode) -> Result<(), ReflectError> {
        if self.node(base.target).map_or(true, |n| !n.registered) {
            return Err(ReflectError::DetachedType { key: base.target.0 });
        }
        self.attached_mut(base.parent)?.bases.push(base);
        Ok(())
    }

    /// Link a conversion edge to its declaring type.
    pub fn link_conv(&mut self, conv: ConvNode) -> Result<(), ReflectError> {
        if self.node(conv.target).map_or(true, |n| !n.registered) {
            return Err(ReflectError::DetachedType { key: conv.target.0 });
        }
        self.attached_mut(conv.parent)?.convs.push(conv);
        Ok(())
    }

    /// Link a constructor to its declaring type; returns the constructor's
    /// declaration index.
    pub fn link_ctor(&mut self, ctor: CtorNode) -> Result<usize, ReflectError> {
        let node = self.attached_mut(ctor.parent)?;
        node.ctors.push(ctor);
        Ok(node.ctors.len() - 1)
    }

    /// Link the destructor of its declaring type; at most one is allowed.
    pub fn link_dtor(&mut self, dtor: DtorNode) -> Result<(), ReflectError> {
        let node = self.attached_mut(dtor.parent)?;
        if node.dtor.is_some() {
            return Err(ReflectError::DestructorAlreadySet);
        }
        node.dtor = Some(dtor);
        Ok(())
    }

    /// Link a data member to its declaring type.
    pub fn link_data(&mut self, data: DataNode) -> Result<(), ReflectError> {
        let node = self.attached_mut(data.parent)?;
        if node.data.iter().any(|d| d.identifier == data.identifier) {
            return Err(ReflectError::DuplicateMemberIdentifier {
                identifier: data.identifier,
            });
        }
        node.data.push(data);
        Ok(())
    }

    /// Link a member function to its declaring type.
    pub fn link_func(&mut self, func: FuncNode) -> Result<(), ReflectError> {
        let node = self.attached_mut(func.parent)?;
        if node.funcs.iter().any(|f| f.identifier == func.identifier) {
            return Err(ReflectError::DuplicateMemberIdentifier {
                identifier: func.identifier,
            });
        }
        node.funcs.push(func);
        Ok(())
    }

    /// Attach a property to a type.
    pub fn link_type_prop(&mut self, key: TypeKey, prop: PropNode) -> Result<(), ReflectError> {
        let node = self.attached_mut(key)?;
        if node.props.iter().any(|p| p.key == prop.key) {
            return Err(ReflectError::DuplicateProperty);
        }
        node.props.push(prop);
        Ok(())
    }

    /// Attach a property to a constructor, addressed by declaration index.
    pub fn link_ctor_prop(
        &mut self,
        key: TypeKey,
        index: usize,
        prop: PropNode,
    ) -> Result<(), ReflectError> {
        let node = self.attached_mut(key)?;
        let Some(ctor) = node.ctors.get_mut(index) else {
            return Err(ReflectError::NoSuchConstructor { index });
        };
        if ctor.props.iter().any(|p| p.key == prop.key) {
            return Err(ReflectError::DuplicateProperty);
        }
        ctor.props.push(prop);
        Ok(())
    }

    /// Attach a property to a locally declared data member.
    pub fn link_data_prop(
        &mut self,
        key: TypeKey,
        member: impl Into<Ident>,
        prop: PropNode,
    ) -> Result<(), ReflectError> {
        let identifier = member.into();
        let node = self.attached_mut(key)?;
        let Some(data) = node.data.iter_mut().find(|d| d.identifier == identifier) else {
            return Err(ReflectError::NoSuchMember { identifier });
        };
        if data.props.iter().any(|p| p.key == prop.key) {
            return Err(ReflectError::DuplicateProperty);
        }
        data.props.push(prop);
        Ok(())
    }

    /// Attach a property to a locally declared member function.
    pub fn link_func_prop(
        &mut self,
        key: TypeKey,
        member: impl Into<Ident>,
        prop: PropNode,
    ) -> Result<(), ReflectError> {
        let identifier = member.into();
        let node = self.attached_mut(key)?;
        let Some(func) = node.funcs.iter_mut().find(|f| f.identifier == identifier) else {
            return Err(ReflectError::NoSuchMember { identifier });
        };
        if func.props.iter().any(|p| p.key == prop.key) {
            return Err(ReflectError::DuplicateProperty);
        }
        func.props.push(prop);
        Ok(())
    }

    /// Check whether `base` is reachable from `derived` through base edges.
    pub fn is_transitive_base(&self, derived: TypeKey, base: TypeKey) -> bool {
        traverse::find_first(self, derived, |node| node.bases.as_slice(), &mut |edge: &BaseNode| {
            edge.target == base
        })
        .is_some()
    }

    /// Adjust an instance pointer of type `from` to the layout of base type
    /// `to`, composing the registered base casts along the chain.
    ///
    /// Identity when `from == to`. `None` when `to` is not a (transitive)
    /// base of `from`.
    pub fn upcast_ptr(&self, from: TypeKey, to: TypeKey, ptr: *const u8) -> Option<*const u8> {
        let node = self.node(from)?;
        if !node.registered {
            return None;
        }
        if from == to {
            return Some(ptr);
        }
        for base in &node.bases {
            if let Some(adjusted) = self.upcast_ptr(base.target, to, (base.cast)(ptr)) {
                return Some(adjusted);
            }
        }
        None
    }

    /// Check whether a value of type `from` is accepted where `to` is
    /// expected: identical types, upcast through base edges, or a
    /// registered conversion.
    pub fn can_cast_or_convert(&self, from: TypeKey, to: TypeKey) -> bool {
        if from == to || self.is_transitive_base(from, to) {
            return true;
        }
        traverse::find_first(self, from, |node| node.convs.as_slice(), &mut |conv: &ConvNode| {
            conv.target == to
        })
        .is_some()
    }
}

/// Create a registry pre-populated with the fundamental types.
///
/// Fundamentals compare by value and carry the usual widening conversions
/// between the arithmetic types.
pub fn create_standard_registry() -> Result<TypeRegistry, ReflectError> {
    let mut registry = TypeRegistry::new();

    registry.register_eq::<()>(TypeDesc::named("unit").with_traits(TypeTraits::void_type()))?;
    registry.register_eq::<bool>(TypeDesc::named("bool").with_traits(TypeTraits::integral()))?;
    let c = registry
        .register_eq::<char>(TypeDesc::named("char").with_traits(TypeTraits::integral()))?;
    let i32_key = registry
        .register_eq::<i32>(TypeDesc::named("i32").with_traits(TypeTraits::integral()))?;
    let i64_key = registry
        .register_eq::<i64>(TypeDesc::named("i64").with_traits(TypeTraits::integral()))?;
    let f32_key = registry
        .register_eq::<f32>(TypeDesc::named("f32").with_traits(TypeTraits::floating_point()))?;
    let f64_key = registry
        .register_eq::<f64>(TypeDesc::named("f64").with_traits(TypeTraits::floating_point()))?;
    let usize_key = registry
        .register_eq::<usize>(TypeDesc::named("usize").with_traits(TypeTraits::integral()))?;
    registry.register_eq::<String>(TypeDesc::named("String").with_traits(TypeTraits::class()))?;

    registry.link_conv(ConvNode::new::<i32, i64>(i32_key, i64_key, |v| *v as i64))?;
    registry.link_conv(ConvNode::new::<i32, f64>(i32_key, f64_key, |v| *v as f64))?;
    registry.link_conv(ConvNode::new::<i64, i32>(i64_key, i32_key, |v| *v as i32))?;
    registry.link_conv(ConvNode::new::<f32, f64>(f32_key, f64_key, |v| *v as f64))?;
    registry.link_conv(ConvNode::new::<char, i32>(c, i32_key, |v| *v as i32))?;
    registry.link_conv(ConvNode::new::<usize, i64>(usize_key, i64_key, |v| {
        *v as i64
    }))?;

    Ok(registry)
}
