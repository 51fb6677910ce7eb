use crate::{ElementType, Runtime, RuntimeError};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// A runtime-owned value that is released through its runtime when dropped.
///
/// The guard holds the runtime alive, so a handle may outlive the code that
/// created it (for example while a call is in flight on another thread).
pub struct Handle<R: Runtime, T> {
    runtime: Arc<R>,
    value: Option<T>,
    release: fn(&R, T),
}

impl<R: Runtime, T> Handle<R, T> {
    /// Take ownership of `value`; `release` runs exactly once, on drop or on
    /// [`Handle::release`].
    pub fn new(runtime: Arc<R>, value: T, release: fn(&R, T)) -> Self {
        Self {
            runtime,
            value: Some(value),
            release,
        }
    }

    /// Release now instead of at the end of the scope.
    pub fn release(mut self) {
        self.release_inner();
    }

    pub fn runtime(&self) -> &Arc<R> {
        &self.runtime
    }

    fn release_inner(&mut self) {
        if let Some(value) = self.value.take() {
            (self.release)(&self.runtime, value);
        }
    }
}

impl<R: Runtime, T> Deref for Handle<R, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Only `release_inner` empties the slot, and it runs from consuming
        // methods or Drop
        match self.value.as_ref() {
            Some(value) => value,
            None => unreachable!("handle used after release"),
        }
    }
}

impl<R: Runtime, T> Drop for Handle<R, T> {
    fn drop(&mut self) {
        self.release_inner();
    }
}

impl<R: Runtime, T> fmt::Debug for Handle<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("runtime", &self.runtime.name())
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

pub fn create_device<R: Runtime>(runtime: &Arc<R>) -> Result<Handle<R, R::Device>, RuntimeError> {
    let device = runtime.create_device()?;
    Ok(Handle::new(runtime.clone(), device, R::release_device))
}

pub fn create_vm_instance<R: Runtime>(
    runtime: &Arc<R>,
) -> Result<Handle<R, R::VmInstance>, RuntimeError> {
    let vm = runtime.create_vm_instance()?;
    Ok(Handle::new(runtime.clone(), vm, R::release_vm_instance))
}

pub fn create_tensor<R: Runtime>(
    runtime: &Arc<R>,
    data: &[u8],
    shape: &[i32],
    element_type: ElementType,
) -> Result<Handle<R, R::Tensor>, RuntimeError> {
    let tensor = runtime.create_tensor(data, shape, element_type)?;
    Ok(Handle::new(runtime.clone(), tensor, R::release_tensor))
}

pub fn create_data_buffer<R: Runtime>(
    runtime: &Arc<R>,
    bytes: &[u8],
) -> Result<Handle<R, R::DataBuffer>, RuntimeError> {
    let buffer = runtime.create_data_buffer(bytes)?;
    Ok(Handle::new(runtime.clone(), buffer, R::release_data_buffer))
}

/// Adopt a tensor the runtime handed back (e.g. a call output).
pub fn adopt_tensor<R: Runtime>(runtime: &Arc<R>, tensor: R::Tensor) -> Handle<R, R::Tensor> {
    Handle::new(runtime.clone(), tensor, R::release_tensor)
}
