//! Type-erased value container
//!
//! `AnyValue` owns (or borrows) one instance of a registered type together
//! with the erased operations needed to copy, compare and destroy it.
//! Values small enough for the inline buffer are stored in place; larger
//! ones go to the heap. Ownership moves with the container itself, so a
//! moved-from value is simply gone; `take` exists for explicit steals out
//! of borrowed containers.
//!
//! A value built for an unregistered type is empty: erased instances of
//! types the registry does not know are unusable anyway.

use crate::handle::AnyHandle;
use crate::info::TypeInfo;
use crate::node::{identity_compare, CompareFn, ConvNode, DtorFn, TypeKey};
use crate::registry::TypeRegistry;
use crate::traverse;
use std::mem::MaybeUninit;
use std::ptr::NonNull;

const fn fits_inline<T>() -> bool {
    std::mem::size_of::<T>() <= std::mem::size_of::<usize>()
        && std::mem::align_of::<T>() <= std::mem::align_of::<usize>()
}

/// Where the instance lives.
enum Storage {
    Empty,
    Inline(MaybeUninit<usize>),
    Heap(NonNull<u8>),
    Borrowed(*mut u8),
}

impl Storage {
    fn as_ptr(&self) -> *const u8 {
        match self {
            Storage::Empty => std::ptr::null(),
            Storage::Inline(slot) => slot.as_ptr() as *const u8,
            Storage::Heap(ptr) => ptr.as_ptr(),
            Storage::Borrowed(ptr) => *ptr as *const u8,
        }
    }

    fn as_mut_ptr(&mut self) -> *mut u8 {
        match self {
            Storage::Empty => std::ptr::null_mut(),
            Storage::Inline(slot) => slot.as_mut_ptr() as *mut u8,
            Storage::Heap(ptr) => ptr.as_ptr(),
            Storage::Borrowed(ptr) => *ptr,
        }
    }

    fn is_owned(&self) -> bool {
        matches!(self, Storage::Inline(_) | Storage::Heap(_))
    }
}

fn store<T: 'static>(value: T) -> Storage {
    if fits_inline::<T>() {
        let mut slot = MaybeUninit::<usize>::uninit();
        unsafe { (slot.as_mut_ptr() as *mut T).write(value) };
        Storage::Inline(slot)
    } else {
        let ptr = Box::into_raw(Box::new(value)) as *mut u8;
        // Box::into_raw never returns null.
        Storage::Heap(unsafe { NonNull::new_unchecked(ptr) })
    }
}

unsafe fn copy_value<T: Clone + 'static>(src: *const u8) -> Storage {
    store((*(src as *const T)).clone())
}

unsafe fn drop_value<T>(storage: &mut Storage) {
    match storage {
        Storage::Inline(slot) => std::ptr::drop_in_place(slot.as_mut_ptr() as *mut T),
        Storage::Heap(ptr) => drop(Box::from_raw(ptr.as_ptr() as *mut T)),
        Storage::Empty | Storage::Borrowed(_) => {}
    }
}

/// Erased per-type operations of an owned instance.
#[derive(Clone, Copy)]
struct AnyOps {
    copy: unsafe fn(*const u8) -> Storage,
    drop: unsafe fn(&mut Storage),
}

impl AnyOps {
    fn of<T: Clone + 'static>() -> Self {
        AnyOps {
            copy: copy_value::<T>,
            drop: drop_value::<T>,
        }
    }
}

/// Type-erased container for one instance of a registered type.
pub struct AnyValue {
    key: Option<TypeKey>,
    storage: Storage,
    ops: Option<AnyOps>,
    compare: CompareFn,
    dtor: Option<DtorFn>,
}

impl AnyValue {
    /// Erase a value.
    ///
    /// The result is empty when `T` is not attached to the registry; in
    /// that case `value` is dropped normally.
    pub fn new<T: Clone + 'static>(registry: &TypeRegistry, value: T) -> Self {
        let Some(key) = registry.key_of::<T>() else {
            return AnyValue::default();
        };
        let node = match registry.node(key) {
            Some(node) => node,
            None => return AnyValue::default(),
        };
        AnyValue {
            key: Some(key),
            storage: store(value),
            ops: Some(AnyOps::of::<T>()),
            compare: node.compare,
            dtor: node.dtor.as_ref().map(|d| d.invoke.clone()),
        }
    }

    /// Shared-borrow flavor of [`AnyValue::from_mut`].
    ///
    /// # Safety
    ///
    /// As for [`AnyValue::from_mut`]; additionally the caller must not
    /// write to the instance through the container.
    pub unsafe fn from_ref<T: 'static>(registry: &TypeRegistry, instance: *const T) -> Self {
        AnyValue::from_mut(registry, instance as *mut T)
    }

    /// Erase a borrowed instance without taking ownership.
    ///
    /// The container aliases `instance`; clones alias it too and dropping
    /// the container leaves it untouched.
    ///
    /// # Safety
    ///
    /// The caller must keep `instance` alive and unaliased for as long as
    /// this container or any clone of it is used.
    pub unsafe fn from_mut<T: 'static>(registry: &TypeRegistry, instance: *mut T) -> Self {
        let Some(key) = registry.key_of::<T>() else {
            return AnyValue::default();
        };
        let node = match registry.node(key) {
            Some(node) => node,
            None => return AnyValue::default(),
        };
        AnyValue {
            key: Some(key),
            storage: Storage::Borrowed(instance as *mut u8),
            ops: None,
            compare: node.compare,
            dtor: None,
        }
    }

    /// The empty container.
    pub fn empty() -> Self {
        AnyValue::default()
    }

    /// Check whether the container holds an instance of a registered type.
    pub fn is_valid(&self) -> bool {
        self.key.is_some()
    }

    /// Key of the held instance's type.
    pub fn key(&self) -> Option<TypeKey> {
        self.key
    }

    /// Descriptor view of the held instance's type.
    pub fn info<'r>(&self, registry: &'r TypeRegistry) -> Option<TypeInfo<'r>> {
        registry.info(self.key?)
    }

    /// Raw pointer to the held instance.
    pub fn data(&self) -> *const u8 {
        self.storage.as_ptr()
    }

    /// Check whether the container aliases an external instance rather than
    /// owning one.
    pub fn is_borrowed(&self) -> bool {
        matches!(self.storage, Storage::Borrowed(_))
    }

    /// Move the instance out, leaving this container empty.
    pub fn take(&mut self) -> AnyValue {
        std::mem::take(self)
    }

    /// Non-owning handle to the held instance.
    pub fn as_handle(&mut self) -> AnyHandle<'_> {
        AnyHandle::raw(self.key, self.storage.as_mut_ptr())
    }

    /// Borrow the instance as `T`, upcasting through base edges if needed.
    pub fn try_cast<T: 'static>(&self, registry: &TypeRegistry) -> Option<&T> {
        let from = self.key?;
        let to = registry.key_of::<T>()?;
        let ptr = self.storage.as_ptr();
        if ptr.is_null() {
            return None;
        }
        let adjusted = registry.upcast_ptr(from, to, ptr)?;
        Some(unsafe { &*(adjusted as *const T) })
    }

    /// Mutably borrow the instance as `T`, upcasting through base edges if
    /// needed.
    pub fn try_cast_mut<T: 'static>(&mut self, registry: &TypeRegistry) -> Option<&mut T> {
        let from = self.key?;
        let to = registry.key_of::<T>()?;
        let ptr = self.storage.as_mut_ptr();
        if ptr.is_null() {
            return None;
        }
        let adjusted = registry.upcast_ptr(from, to, ptr as *const u8)?;
        Some(unsafe { &mut *(adjusted as *mut T) })
    }

    /// Borrow the instance as `T`.
    ///
    /// # Panics
    ///
    /// Panics when the held instance cannot be viewed as `T`; callers that
    /// have not already checked the type belong on [`AnyValue::try_cast`].
    pub fn cast<T: 'static>(&self, registry: &TypeRegistry) -> &T {
        match self.try_cast::<T>(registry) {
            Some(value) => value,
            None => panic!("erased value does not hold the requested type"),
        }
    }

    /// Mutably borrow the instance as `T`.
    ///
    /// # Panics
    ///
    /// Panics when the held instance cannot be viewed as `T`.
    pub fn cast_mut<T: 'static>(&mut self, registry: &TypeRegistry) -> &mut T {
        match self.try_cast_mut::<T>(registry) {
            Some(value) => value,
            None => panic!("erased value does not hold the requested type"),
        }
    }

    /// Produce a value of the target type through a registered conversion.
    ///
    /// An identical target type yields a clone. Otherwise the conversion
    /// edges of the held type and its bases are searched in declaration
    /// order. Empty on failure.
    pub fn convert<T: 'static>(&self, registry: &TypeRegistry) -> AnyValue {
        let (Some(from), Some(to)) = (self.key, registry.key_of::<T>()) else {
            return AnyValue::default();
        };
        if from == to {
            return self.clone();
        }
        let ptr = self.storage.as_ptr();
        if ptr.is_null() {
            return AnyValue::default();
        }
        let Some(conv) = traverse::find_first(
            registry,
            from,
            |node| node.convs.as_slice(),
            &mut |conv: &ConvNode| conv.target == to,
        ) else {
            return AnyValue::default();
        };
        // The edge may be declared on a base; adjust the pointer to the
        // declaring type's layout first.
        let Some(adjusted) = registry.upcast_ptr(from, conv.parent, ptr) else {
            return AnyValue::default();
        };
        (conv.convert)(registry, adjusted)
    }

    /// Convert in place, replacing the held instance with the converted
    /// one. The container is left untouched on failure.
    pub fn convert_in_place<T: 'static>(&mut self, registry: &TypeRegistry) -> bool {
        if self.key.is_some() && self.key == registry.key_of::<T>() {
            return true;
        }
        let converted = self.convert::<T>(registry);
        if !converted.is_valid() {
            return false;
        }
        *self = converted;
        true
    }

    /// Extract a typed copy of the instance, casting when the type matches
    /// (or is a base) and converting otherwise.
    pub fn to_value<T: Clone + 'static>(&self, registry: &TypeRegistry) -> Option<T> {
        if let Some(value) = self.try_cast::<T>(registry) {
            return Some(value.clone());
        }
        self.convert::<T>(registry).try_cast::<T>(registry).cloned()
    }
}

impl Default for AnyValue {
    fn default() -> Self {
        AnyValue {
            key: None,
            storage: Storage::Empty,
            ops: None,
            compare: identity_compare,
            dtor: None,
        }
    }
}

impl Clone for AnyValue {
    /// Deep copy of an owned instance; clones of a borrowed container
    /// alias the same external instance.
    fn clone(&self) -> Self {
        let storage = match &self.storage {
            Storage::Empty => return AnyValue::default(),
            Storage::Borrowed(ptr) => Storage::Borrowed(*ptr),
            owned => match self.ops {
                Some(ops) => unsafe { (ops.copy)(owned.as_ptr()) },
                None => return AnyValue::default(),
            },
        };
        AnyValue {
            key: self.key,
            storage,
            ops: self.ops,
            compare: self.compare,
            dtor: self.dtor.clone(),
        }
    }
}

impl Drop for AnyValue {
    fn drop(&mut self) {
        if self.storage.is_owned() {
            if let Some(hook) = self.dtor.take() {
                let accepted = hook(AnyHandle::raw(self.key, self.storage.as_mut_ptr()));
                debug_assert!(accepted, "destructor hook rejected its own instance");
            }
        }
        if let Some(ops) = self.ops {
            unsafe { (ops.drop)(&mut self.storage) };
        }
        self.storage = Storage::Empty;
    }
}

impl PartialEq for AnyValue {
    /// Two containers are equal when they hold instances of the same type
    /// that compare equal under the type's registered comparison. Two
    /// empty containers are equal.
    fn eq(&self, other: &Self) -> bool {
        if self.key != other.key {
            return false;
        }
        if self.key.is_none() {
            return true;
        }
        let (lhs, rhs) = (self.storage.as_ptr(), other.storage.as_ptr());
        if lhs.is_null() || rhs.is_null() {
            return lhs.is_null() && rhs.is_null();
        }
        unsafe { (self.compare)(lhs, rhs) }
    }
}

impl std::fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnyValue")
            .field("key", &self.key)
            .field("borrowed", &self.is_borrowed())
            .finish()
    }
}
