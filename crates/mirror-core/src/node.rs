//! Node types that make up the reflection graph
//!
//! A `TypeNode` describes one registered type and owns insertion-ordered
//! lists of edges and members. Child nodes carry erased closures built by
//! the registration front-end; the constructors in this module do the
//! monomorphized-to-erased wiring so front-ends work with plain functions.

use crate::any::AnyValue;
use crate::handle::AnyHandle;
use crate::ident::Ident;
use crate::registry::TypeRegistry;
use std::any::TypeId as StdTypeId;
use std::sync::Arc;

/// Stable index of a type descriptor inside its owning registry.
///
/// Keys never move or get reused; a key stays valid across unregistration
/// and re-registration of the type it names. Keys from different registries
/// must not be mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey(pub(crate) u32);

impl TypeKey {
    /// Raw index value, for diagnostics.
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

/// Classification flags of a registered type.
///
/// The flags mirror the host-language classification of the reflected type;
/// they are descriptive only and never interpreted by the engine itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeTraits {
    /// The type is the void/unit type.
    pub is_void: bool,
    /// The type is an integral type.
    pub is_integral: bool,
    /// The type is a floating-point type.
    pub is_floating_point: bool,
    /// The type is a fixed-extent array.
    pub is_array: bool,
    /// The type is an enumeration.
    pub is_enum: bool,
    /// The type is an untagged union.
    pub is_union: bool,
    /// The type is a class/struct.
    pub is_class: bool,
    /// The type is a pointer.
    pub is_pointer: bool,
    /// The type is a pointer to a free function.
    pub is_function_pointer: bool,
    /// The type is a pointer to a member object.
    pub is_member_object_pointer: bool,
    /// The type is a pointer to a member function.
    pub is_member_function_pointer: bool,
}

impl TypeTraits {
    /// Flags for a class/struct type.
    pub const fn class() -> Self {
        let mut t = Self::none();
        t.is_class = true;
        t
    }

    /// Flags for an integral type.
    pub const fn integral() -> Self {
        let mut t = Self::none();
        t.is_integral = true;
        t
    }

    /// Flags for a floating-point type.
    pub const fn floating_point() -> Self {
        let mut t = Self::none();
        t.is_floating_point = true;
        t
    }

    /// Flags for the void/unit type.
    pub const fn void_type() -> Self {
        let mut t = Self::none();
        t.is_void = true;
        t
    }

    /// Flags for an enumeration type.
    pub const fn enumeration() -> Self {
        let mut t = Self::none();
        t.is_enum = true;
        t
    }

    /// Flags for a fixed-extent array type.
    pub const fn array() -> Self {
        let mut t = Self::none();
        t.is_array = true;
        t
    }

    /// Flags for a pointer type.
    pub const fn pointer() -> Self {
        let mut t = Self::none();
        t.is_pointer = true;
        t
    }

    /// All flags cleared.
    pub const fn none() -> Self {
        TypeTraits {
            is_void: false,
            is_integral: false,
            is_floating_point: false,
            is_array: false,
            is_enum: false,
            is_union: false,
            is_class: false,
            is_pointer: false,
            is_function_pointer: false,
            is_member_object_pointer: false,
            is_member_function_pointer: false,
        }
    }
}

/// Descriptor input for type registration.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeDesc {
    /// Identifier of the type; `Ident::ANONYMOUS` for fundamental/unnamed
    /// types.
    pub identifier: Ident,
    /// Classification flags.
    pub traits: TypeTraits,
    /// Number of elements if the type is an array, 0 otherwise.
    pub extent: usize,
    /// Descriptor of the pointee type if the type is a pointer.
    pub pointee: Option<TypeKey>,
    /// Descriptor of the element type if the type is an array.
    pub element: Option<TypeKey>,
}

impl TypeDesc {
    /// Descriptor for an anonymous (fundamental) type.
    pub fn anonymous() -> Self {
        TypeDesc::default()
    }

    /// Descriptor for a named type.
    pub fn named(identifier: impl Into<Ident>) -> Self {
        TypeDesc {
            identifier: identifier.into(),
            ..TypeDesc::default()
        }
    }

    /// Set the classification flags.
    pub fn with_traits(mut self, traits: TypeTraits) -> Self {
        self.traits = traits;
        self
    }

    /// Set the array extent.
    pub fn with_extent(mut self, extent: usize) -> Self {
        self.extent = extent;
        self
    }

    /// Set the element-type descriptor for array types.
    pub fn with_element(mut self, element: TypeKey) -> Self {
        self.element = Some(element);
        self
    }

    /// Set the pointee-type descriptor for pointer types.
    pub fn with_pointee(mut self, pointee: TypeKey) -> Self {
        self.pointee = Some(pointee);
        self
    }
}

/// Erased equality comparison over two instance pointers.
pub(crate) type CompareFn = unsafe fn(*const u8, *const u8) -> bool;

/// Pointer-identity comparison, the fallback for types without equality.
pub(crate) unsafe fn identity_compare(lhs: *const u8, rhs: *const u8) -> bool {
    std::ptr::eq(lhs, rhs)
}

/// Value comparison through the type's own equality operator.
pub(crate) unsafe fn value_compare<T: PartialEq>(lhs: *const u8, rhs: *const u8) -> bool {
    *(lhs as *const T) == *(rhs as *const T)
}

/// Erased upcast of an instance pointer from a derived to a base layout.
pub(crate) type CastFn = Box<dyn Fn(*const u8) -> *const u8>;

/// Erased conversion producing a new value from a source instance pointer.
pub(crate) type ConvFn = Box<dyn Fn(&TypeRegistry, *const u8) -> AnyValue>;

/// Erased constructor invocation over a list of erased arguments.
pub(crate) type CtorFn = Box<dyn Fn(&TypeRegistry, &[AnyValue]) -> AnyValue>;

/// Shared destructor hook; also invoked during owned-value teardown.
pub(crate) type DtorFn = Arc<dyn Fn(AnyHandle<'_>) -> bool>;

/// Erased setter over a handle, an optional array index and a value.
pub(crate) type SetFn = Box<dyn Fn(&TypeRegistry, AnyHandle<'_>, Option<usize>, AnyValue) -> bool>;

/// Erased getter over a handle and an optional array index.
pub(crate) type GetFn = Box<dyn Fn(&TypeRegistry, AnyHandle<'_>, Option<usize>) -> AnyValue>;

/// Erased member-function invocation.
pub(crate) type InvokeFn = Box<dyn Fn(&TypeRegistry, AnyHandle<'_>, &[AnyValue]) -> AnyValue>;

/// Resolve the instance a handle refers to as a pointer to the declaring
/// type, upcasting through registered base edges when needed.
fn instance_ptr<C: 'static>(
    registry: &TypeRegistry,
    parent: TypeKey,
    handle: &AnyHandle<'_>,
) -> Option<*mut C> {
    let key = handle.key()?;
    let ptr = registry.upcast_ptr(key, parent, handle.data() as *const u8)?;
    Some(ptr as *mut C)
}

/// One registered type: classification, comparison and member lists.
pub struct TypeNode {
    pub(crate) rust_id: StdTypeId,
    pub(crate) identifier: Ident,
    pub(crate) traits: TypeTraits,
    pub(crate) extent: usize,
    pub(crate) pointee: Option<TypeKey>,
    pub(crate) element: Option<TypeKey>,
    pub(crate) compare: CompareFn,
    pub(crate) registered: bool,
    pub(crate) bases: Vec<BaseNode>,
    pub(crate) convs: Vec<ConvNode>,
    pub(crate) ctors: Vec<CtorNode>,
    pub(crate) dtor: Option<DtorNode>,
    pub(crate) data: Vec<DataNode>,
    pub(crate) funcs: Vec<FuncNode>,
    pub(crate) props: Vec<PropNode>,
}

impl TypeNode {
    pub(crate) fn new(rust_id: StdTypeId, desc: TypeDesc, compare: CompareFn) -> Self {
        TypeNode {
            rust_id,
            identifier: desc.identifier,
            traits: desc.traits,
            extent: desc.extent,
            pointee: desc.pointee,
            element: desc.element,
            compare,
            registered: true,
            bases: Vec::new(),
            convs: Vec::new(),
            ctors: Vec::new(),
            dtor: None,
            data: Vec::new(),
            funcs: Vec::new(),
            props: Vec::new(),
        }
    }

    /// Clear every owned list and reset the identifier, keeping the node in
    /// place for re-registration.
    pub(crate) fn detach(&mut self) {
        self.identifier = Ident::ANONYMOUS;
        self.registered = false;
        self.bases.clear();
        self.convs.clear();
        self.ctors.clear();
        self.dtor = None;
        self.data.clear();
        self.funcs.clear();
        self.props.clear();
    }
}

/// Base-class edge: upcast from the declaring type to `target`.
pub struct BaseNode {
    pub(crate) parent: TypeKey,
    pub(crate) target: TypeKey,
    pub(crate) cast: CastFn,
}

impl BaseNode {
    /// Build a base edge from a projection to the embedded base object.
    ///
    /// The projection is the safe-cast facility of the host language; the
    /// edge is valid by construction and never re-validated at use time.
    pub fn new<D: 'static, B: 'static>(
        parent: TypeKey,
        target: TypeKey,
        project: fn(&D) -> &B,
    ) -> Self {
        BaseNode {
            parent,
            target,
            cast: Box::new(move |ptr| {
                let derived = unsafe { &*(ptr as *const D) };
                project(derived) as *const B as *const u8
            }),
        }
    }
}

/// Conversion edge: produce a `target`-typed value from the declaring type.
pub struct ConvNode {
    pub(crate) parent: TypeKey,
    pub(crate) target: TypeKey,
    pub(crate) convert: ConvFn,
}

impl ConvNode {
    /// Build a conversion edge from a plain conversion function.
    pub fn new<S: 'static, T: Clone + 'static>(
        parent: TypeKey,
        target: TypeKey,
        convert: fn(&S) -> T,
    ) -> Self {
        ConvNode {
            parent,
            target,
            convert: Box::new(move |registry, ptr| {
                let source = unsafe { &*(ptr as *const S) };
                AnyValue::new(registry, convert(source))
            }),
        }
    }
}

/// Constructor of the declaring type.
pub struct CtorNode {
    pub(crate) parent: TypeKey,
    pub(crate) args: Vec<TypeKey>,
    pub(crate) invoke: CtorFn,
    pub(crate) props: Vec<PropNode>,
}

impl CtorNode {
    /// Constructor taking no arguments.
    pub fn nullary<T: Clone + 'static>(parent: TypeKey, construct: fn() -> T) -> Self {
        CtorNode {
            parent,
            args: Vec::new(),
            props: Vec::new(),
            invoke: Box::new(move |registry, supplied| {
                if !supplied.is_empty() {
                    return AnyValue::default();
                }
                AnyValue::new(registry, construct())
            }),
        }
    }

    /// Constructor taking one argument.
    pub fn unary<T, A>(parent: TypeKey, args: [TypeKey; 1], construct: fn(A) -> T) -> Self
    where
        T: Clone + 'static,
        A: Clone + 'static,
    {
        CtorNode {
            parent,
            args: args.to_vec(),
            props: Vec::new(),
            invoke: Box::new(move |registry, supplied| {
                if supplied.len() != 1 {
                    return AnyValue::default();
                }
                let Some(a) = supplied[0].to_value::<A>(registry) else {
                    return AnyValue::default();
                };
                AnyValue::new(registry, construct(a))
            }),
        }
    }

    /// Constructor taking two arguments.
    pub fn binary<T, A, B>(parent: TypeKey, args: [TypeKey; 2], construct: fn(A, B) -> T) -> Self
    where
        T: Clone + 'static,
        A: Clone + 'static,
        B: Clone + 'static,
    {
        CtorNode {
            parent,
            args: args.to_vec(),
            props: Vec::new(),
            invoke: Box::new(move |registry, supplied| {
                if supplied.len() != 2 {
                    return AnyValue::default();
                }
                let (Some(a), Some(b)) = (
                    supplied[0].to_value::<A>(registry),
                    supplied[1].to_value::<B>(registry),
                ) else {
                    return AnyValue::default();
                };
                AnyValue::new(registry, construct(a, b))
            }),
        }
    }

    /// Constructor taking three arguments.
    pub fn ternary<T, A, B, C>(
        parent: TypeKey,
        args: [TypeKey; 3],
        construct: fn(A, B, C) -> T,
    ) -> Self
    where
        T: Clone + 'static,
        A: Clone + 'static,
        B: Clone + 'static,
        C: Clone + 'static,
    {
        CtorNode {
            parent,
            args: args.to_vec(),
            props: Vec::new(),
            invoke: Box::new(move |registry, supplied| {
                if supplied.len() != 3 {
                    return AnyValue::default();
                }
                let (Some(a), Some(b), Some(c)) = (
                    supplied[0].to_value::<A>(registry),
                    supplied[1].to_value::<B>(registry),
                    supplied[2].to_value::<C>(registry),
                ) else {
                    return AnyValue::default();
                };
                AnyValue::new(registry, construct(a, b, c))
            }),
        }
    }
}

/// Destructor of the declaring type, at most one per descriptor.
pub struct DtorNode {
    pub(crate) parent: TypeKey,
    pub(crate) invoke: DtorFn,
}

impl DtorNode {
    /// Build a destructor from a teardown hook.
    ///
    /// The hook runs before the instance's own drop logic; the invocation
    /// reports false when the handle does not refer to the declaring type.
    pub fn new<T: 'static>(parent: TypeKey, teardown: fn(&mut T)) -> Self {
        DtorNode {
            parent,
            invoke: Arc::new(move |handle| {
                if handle.key() != Some(parent) || handle.data().is_null() {
                    return false;
                }
                teardown(unsafe { &mut *(handle.data() as *mut T) });
                true
            }),
        }
    }
}

/// Data member of the declaring type.
pub struct DataNode {
    pub(crate) identifier: Ident,
    pub(crate) parent: TypeKey,
    pub(crate) ty: TypeKey,
    pub(crate) is_const: bool,
    pub(crate) is_static: bool,
    pub(crate) set: SetFn,
    pub(crate) get: GetFn,
    pub(crate) props: Vec<PropNode>,
}

impl DataNode {
    /// Read-write instance field.
    pub fn field<C, T>(
        identifier: impl Into<Ident>,
        parent: TypeKey,
        ty: TypeKey,
        get: fn(&C) -> &T,
        set: fn(&mut C, T),
    ) -> Self
    where
        C: 'static,
        T: Clone + 'static,
    {
        DataNode {
            identifier: identifier.into(),
            parent,
            ty,
            is_const: false,
            is_static: false,
            props: Vec::new(),
            get: Box::new(move |registry, handle, index| {
                if index.is_some() {
                    return AnyValue::default();
                }
                let Some(obj) = instance_ptr::<C>(registry, parent, &handle) else {
                    debug_assert!(false, "handle does not refer to the declaring type");
                    return AnyValue::default();
                };
                AnyValue::new(registry, get(unsafe { &*obj }).clone())
            }),
            set: Box::new(move |registry, handle, index, value| {
                if index.is_some() {
                    return false;
                }
                let Some(obj) = instance_ptr::<C>(registry, parent, &handle) else {
                    debug_assert!(false, "handle does not refer to the declaring type");
                    return false;
                };
                let Some(value) = value.to_value::<T>(registry) else {
                    return false;
                };
                set(unsafe { &mut *obj }, value);
                true
            }),
        }
    }

    /// Read-only instance field; the setter always reports failure.
    pub fn field_readonly<C, T>(
        identifier: impl Into<Ident>,
        parent: TypeKey,
        ty: TypeKey,
        get: fn(&C) -> &T,
    ) -> Self
    where
        C: 'static,
        T: Clone + 'static,
    {
        DataNode {
            identifier: identifier.into(),
            parent,
            ty,
            is_const: true,
            is_static: false,
            props: Vec::new(),
            get: Box::new(move |registry, handle, index| {
                if index.is_some() {
                    return AnyValue::default();
                }
                let Some(obj) = instance_ptr::<C>(registry, parent, &handle) else {
                    debug_assert!(false, "handle does not refer to the declaring type");
                    return AnyValue::default();
                };
                AnyValue::new(registry, get(unsafe { &*obj }).clone())
            }),
            set: Box::new(move |_, _, _, _| false),
        }
    }

    /// Static variable, read and written without an instance.
    pub fn static_var<T: Clone + 'static>(
        identifier: impl Into<Ident>,
        parent: TypeKey,
        ty: TypeKey,
        get: fn() -> T,
        set: Option<fn(T)>,
    ) -> Self {
        DataNode {
            identifier: identifier.into(),
            parent,
            ty,
            is_const: set.is_none(),
            is_static: true,
            props: Vec::new(),
            get: Box::new(move |registry, _, index| {
                if index.is_some() {
                    return AnyValue::default();
                }
                AnyValue::new(registry, get())
            }),
            set: Box::new(move |registry, _, index, value| {
                if index.is_some() {
                    return false;
                }
                let Some(set) = set else {
                    return false;
                };
                let Some(value) = value.to_value::<T>(registry) else {
                    return false;
                };
                set(value);
                true
            }),
        }
    }

    /// Fixed-extent array field accessed element-wise by index.
    ///
    /// `ty` is the descriptor of the registered array type; its extent
    /// bounds the valid indices. Whole-value access (no index) misses.
    pub fn array_field<C, T, const N: usize>(
        identifier: impl Into<Ident>,
        parent: TypeKey,
        ty: TypeKey,
        get: fn(&C) -> &[T; N],
        set: fn(&mut C) -> &mut [T; N],
    ) -> Self
    where
        C: 'static,
        T: Clone + 'static,
    {
        DataNode {
            identifier: identifier.into(),
            parent,
            ty,
            is_const: false,
            is_static: false,
            props: Vec::new(),
            get: Box::new(move |registry, handle, index| {
                let Some(index) = index else {
                    return AnyValue::default();
                };
                debug_assert!(index < N, "array index out of extent");
                if index >= N {
                    return AnyValue::default();
                }
                let Some(obj) = instance_ptr::<C>(registry, parent, &handle) else {
                    debug_assert!(false, "handle does not refer to the declaring type");
                    return AnyValue::default();
                };
                AnyValue::new(registry, get(unsafe { &*obj })[index].clone())
            }),
            set: Box::new(move |registry, handle, index, value| {
                let Some(index) = index else {
                    return false;
                };
                debug_assert!(index < N, "array index out of extent");
                if index >= N {
                    return false;
                }
                let Some(obj) = instance_ptr::<C>(registry, parent, &handle) else {
                    debug_assert!(false, "handle does not refer to the declaring type");
                    return false;
                };
                let Some(value) = value.to_value::<T>(registry) else {
                    return false;
                };
                set(unsafe { &mut *obj })[index] = value;
                true
            }),
        }
    }
}

/// Member function of the declaring type.
pub struct FuncNode {
    pub(crate) identifier: Ident,
    pub(crate) parent: TypeKey,
    pub(crate) ret: TypeKey,
    pub(crate) args: Vec<TypeKey>,
    pub(crate) is_const: bool,
    pub(crate) is_static: bool,
    pub(crate) invoke: InvokeFn,
    pub(crate) props: Vec<PropNode>,
}

impl FuncNode {
    fn build(
        identifier: Ident,
        parent: TypeKey,
        ret: TypeKey,
        args: Vec<TypeKey>,
        is_const: bool,
        is_static: bool,
        invoke: InvokeFn,
    ) -> Self {
        FuncNode {
            identifier,
            parent,
            ret,
            args,
            is_const,
            is_static,
            invoke,
            props: Vec::new(),
        }
    }

    /// Const member function taking no arguments.
    pub fn const_method0<C, R>(
        identifier: impl Into<Ident>,
        parent: TypeKey,
        ret: TypeKey,
        call: fn(&C) -> R,
    ) -> Self
    where
        C: 'static,
        R: Clone + 'static,
    {
        FuncNode::build(
            identifier.into(),
            parent,
            ret,
            Vec::new(),
            true,
            false,
            Box::new(move |registry, handle, supplied| {
                if !supplied.is_empty() {
                    return AnyValue::default();
                }
                let Some(obj) = instance_ptr::<C>(registry, parent, &handle) else {
                    debug_assert!(false, "handle does not refer to the declaring type");
                    return AnyValue::default();
                };
                AnyValue::new(registry, call(unsafe { &*obj }))
            }),
        )
    }

    /// Const member function taking one argument.
    pub fn const_method1<C, R, A>(
        identifier: impl Into<Ident>,
        parent: TypeKey,
        ret: TypeKey,
        args: [TypeKey; 1],
        call: fn(&C, A) -> R,
    ) -> Self
    where
        C: 'static,
        R: Clone + 'static,
        A: Clone + 'static,
    {
        FuncNode::build(
            identifier.into(),
            parent,
            ret,
            args.to_vec(),
            true,
            false,
            Box::new(move |registry, handle, supplied| {
                if supplied.len() != 1 {
                    return AnyValue::default();
                }
                let Some(obj) = instance_ptr::<C>(registry, parent, &handle) else {
                    debug_assert!(false, "handle does not refer to the declaring type");
                    return AnyValue::default();
                };
                let Some(a) = supplied[0].to_value::<A>(registry) else {
                    return AnyValue::default();
                };
                AnyValue::new(registry, call(unsafe { &*obj }, a))
            }),
        )
    }

    /// Mutating member function taking no arguments.
    pub fn method0<C, R>(
        identifier: impl Into<Ident>,
        parent: TypeKey,
        ret: TypeKey,
        call: fn(&mut C) -> R,
    ) -> Self
    where
        C: 'static,
        R: Clone + 'static,
    {
        FuncNode::build(
            identifier.into(),
            parent,
            ret,
            Vec::new(),
            false,
            false,
            Box::new(move |registry, handle, supplied| {
                if !supplied.is_empty() {
                    return AnyValue::default();
                }
                let Some(obj) = instance_ptr::<C>(registry, parent, &handle) else {
                    debug_assert!(false, "handle does not refer to the declaring type");
                    return AnyValue::default();
                };
                AnyValue::new(registry, call(unsafe { &mut *obj }))
            }),
        )
    }

    /// Mutating member function taking one argument.
    pub fn method1<C, R, A>(
        identifier: impl Into<Ident>,
        parent: TypeKey,
        ret: TypeKey,
        args: [TypeKey; 1],
        call: fn(&mut C, A) -> R,
    ) -> Self
    where
        C: 'static,
        R: Clone + 'static,
        A: Clone + 'static,
    {
        FuncNode::build(
            identifier.into(),
            parent,
            ret,
            args.to_vec(),
            false,
            false,
            Box::new(move |registry, handle, supplied| {
                if supplied.len() != 1 {
                    return AnyValue::default();
                }
                let Some(obj) = instance_ptr::<C>(registry, parent, &handle) else {
                    debug_assert!(false, "handle does not refer to the declaring type");
                    return AnyValue::default();
                };
                let Some(a) = supplied[0].to_value::<A>(registry) else {
                    return AnyValue::default();
                };
                AnyValue::new(registry, call(unsafe { &mut *obj }, a))
            }),
        )
    }

    /// Mutating member function taking two arguments.
    pub fn method2<C, R, A, B>(
        identifier: impl Into<Ident>,
        parent: TypeKey,
        ret: TypeKey,
        args: [TypeKey; 2],
        call: fn(&mut C, A, B) -> R,
    ) -> Self
    where
        C: 'static,
        R: Clone + 'static,
        A: Clone + 'static,
        B: Clone + 'static,
    {
        FuncNode::build(
            identifier.into(),
            parent,
            ret,
            args.to_vec(),
            false,
            false,
            Box::new(move |registry, handle, supplied| {
                if supplied.len() != 2 {
                    return AnyValue::default();
                }
                let Some(obj) = instance_ptr::<C>(registry, parent, &handle) else {
                    debug_assert!(false, "handle does not refer to the declaring type");
                    return AnyValue::default();
                };
                let (Some(a), Some(b)) = (
                    supplied[0].to_value::<A>(registry),
                    supplied[1].to_value::<B>(registry),
                ) else {
                    return AnyValue::default();
                };
                AnyValue::new(registry, call(unsafe { &mut *obj }, a, b))
            }),
        )
    }

    /// Static function taking no arguments; the handle is ignored.
    pub fn static_fn0<R: Clone + 'static>(
        identifier: impl Into<Ident>,
        parent: TypeKey,
        ret: TypeKey,
        call: fn() -> R,
    ) -> Self {
        FuncNode::build(
            identifier.into(),
            parent,
            ret,
            Vec::new(),
            false,
            true,
            Box::new(move |registry, _, supplied| {
                if !supplied.is_empty() {
                    return AnyValue::default();
                }
                AnyValue::new(registry, call())
            }),
        )
    }

    /// Static function taking one argument; the handle is ignored.
    pub fn static_fn1<R, A>(
        identifier: impl Into<Ident>,
        parent: TypeKey,
        ret: TypeKey,
        args: [TypeKey; 1],
        call: fn(A) -> R,
    ) -> Self
    where
        R: Clone + 'static,
        A: Clone + 'static,
    {
        FuncNode::build(
            identifier.into(),
            parent,
            ret,
            args.to_vec(),
            false,
            true,
            Box::new(move |registry, _, supplied| {
                if supplied.len() != 1 {
                    return AnyValue::default();
                }
                let Some(a) = supplied[0].to_value::<A>(registry) else {
                    return AnyValue::default();
                };
                AnyValue::new(registry, call(a))
            }),
        )
    }

    /// Static function taking two arguments; the handle is ignored.
    pub fn static_fn2<R, A, B>(
        identifier: impl Into<Ident>,
        parent: TypeKey,
        ret: TypeKey,
        args: [TypeKey; 2],
        call: fn(A, B) -> R,
    ) -> Self
    where
        R: Clone + 'static,
        A: Clone + 'static,
        B: Clone + 'static,
    {
        FuncNode::build(
            identifier.into(),
            parent,
            ret,
            args.to_vec(),
            false,
            true,
            Box::new(move |registry, _, supplied| {
                if supplied.len() != 2 {
                    return AnyValue::default();
                }
                let (Some(a), Some(b)) = (
                    supplied[0].to_value::<A>(registry),
                    supplied[1].to_value::<B>(registry),
                ) else {
                    return AnyValue::default();
                };
                AnyValue::new(registry, call(a, b))
            }),
        )
    }
}

/// Key/value annotation attachable to types, constructors, data members and
/// functions.
pub struct PropNode {
    pub(crate) key: AnyValue,
    pub(crate) value: AnyValue,
}

impl PropNode {
    /// Build a property from a key/value pair of erased values.
    pub fn new(key: AnyValue, value: AnyValue) -> Self {
        PropNode { key, value }
    }
}
