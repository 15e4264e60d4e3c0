//! Non-owning handles to reflected instances
//!
//! A handle pairs an instance pointer with the key of its registered type
//! and never owns or destroys the instance. The borrow of the referent is
//! carried in the handle's lifetime, so a handle cannot outlive what it
//! points at.

use crate::any::AnyValue;
use crate::info::TypeInfo;
use crate::node::TypeKey;
use crate::registry::TypeRegistry;
use std::marker::PhantomData;

/// Non-owning, type-tagged reference to a reflected instance.
#[derive(Clone, Copy)]
pub struct AnyHandle<'h> {
    key: Option<TypeKey>,
    instance: *mut u8,
    _marker: PhantomData<&'h mut ()>,
}

impl<'h> AnyHandle<'h> {
    /// Handle to a concrete instance.
    ///
    /// The handle is invalid when `T` is not attached to the registry.
    pub fn from_mut<T: 'static>(registry: &TypeRegistry, instance: &'h mut T) -> Self {
        let key = registry.key_of::<T>();
        AnyHandle {
            key,
            instance: if key.is_some() {
                instance as *mut T as *mut u8
            } else {
                std::ptr::null_mut()
            },
            _marker: PhantomData,
        }
    }

    /// Handle to the instance held by an erased value.
    pub fn from_value(value: &'h mut AnyValue) -> Self {
        value.as_handle()
    }

    pub(crate) fn raw(key: Option<TypeKey>, instance: *mut u8) -> Self {
        AnyHandle {
            key,
            instance,
            _marker: PhantomData,
        }
    }

    /// Check whether the handle refers to an instance.
    pub fn is_valid(&self) -> bool {
        !self.instance.is_null()
    }

    /// Key of the referred instance's type.
    pub fn key(&self) -> Option<TypeKey> {
        self.key
    }

    /// Descriptor view of the referred instance's type.
    pub fn ty<'r>(&self, registry: &'r TypeRegistry) -> Option<TypeInfo<'r>> {
        registry.info(self.key?)
    }

    /// Raw pointer to the instance.
    pub fn data(&self) -> *mut u8 {
        self.instance
    }

    /// Borrow the instance as `T`, upcasting through base edges if needed.
    ///
    /// # Safety
    ///
    /// Handles are copyable, so the returned borrow is not tracked against
    /// other copies. The caller must ensure no mutable borrow of the
    /// instance (through this handle, a copy of it, or the original
    /// reference) is live while the returned reference is used.
    pub unsafe fn try_cast<'r, T: 'static>(&self, registry: &'r TypeRegistry) -> Option<&'h T> {
        let from = self.key?;
        let to = registry.key_of::<T>()?;
        if self.instance.is_null() {
            return None;
        }
        let adjusted = registry.upcast_ptr(from, to, self.instance as *const u8)?;
        Some(&*(adjusted as *const T))
    }

    /// Mutably borrow the instance as `T`, upcasting through base edges if
    /// needed.
    ///
    /// # Safety
    ///
    /// The caller must ensure the returned reference is the only live
    /// borrow of the instance: handles are copyable, and nothing stops a
    /// copy from handing out another one.
    ///
    /// ```compile_fail
    /// use mirror_core::{AnyHandle, TypeDesc, TypeRegistry};
    ///
    /// let mut registry = TypeRegistry::new();
    /// registry.register_eq::<i32>(TypeDesc::named("i32")).unwrap();
    /// let mut value = 1i32;
    /// let mut first = AnyHandle::from_mut(&registry, &mut value);
    /// let mut second = first;
    /// // Two aliasing mutable borrows must not be reachable from safe code.
    /// let a = first.try_cast_mut::<i32>(&registry).unwrap();
    /// let b = second.try_cast_mut::<i32>(&registry).unwrap();
    /// *a += *b;
    /// ```
    pub unsafe fn try_cast_mut<T: 'static>(
        &mut self,
        registry: &TypeRegistry,
    ) -> Option<&'h mut T> {
        let from = self.key?;
        let to = registry.key_of::<T>()?;
        if self.instance.is_null() {
            return None;
        }
        let adjusted = registry.upcast_ptr(from, to, self.instance as *const u8)?;
        Some(&mut *(adjusted as *mut T))
    }
}

impl Default for AnyHandle<'static> {
    /// A detached handle, usable as the receiver of static functions.
    fn default() -> Self {
        AnyHandle::raw(None, std::ptr::null_mut())
    }
}

impl std::fmt::Debug for AnyHandle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnyHandle")
            .field("key", &self.key)
            .field("valid", &self.is_valid())
            .finish()
    }
}
