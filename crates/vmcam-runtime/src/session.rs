use crate::handle::{self, Handle};
use crate::{ElementType, Runtime, RuntimeError};
use std::sync::Arc;

/// Long-lived runtime state: one device and one VM instance.
///
/// Both are created by [`Session::open`] and released when the session is
/// closed or dropped. Share a session across threads with `Arc<Session<R>>`;
/// the handles are released after the last reference goes away.
pub struct Session<R: Runtime> {
    // Field order is drop order: the VM instance goes before its device
    vm: Handle<R, R::VmInstance>,
    device: Handle<R, R::Device>,
    runtime: Arc<R>,
}

impl<R: Runtime> Session<R> {
    pub fn open(runtime: Arc<R>) -> Result<Self, RuntimeError> {
        let device = handle::create_device(&runtime)?;
        // If the VM instance fails, `device` is released on the way out
        let vm = handle::create_vm_instance(&runtime)?;
        log::debug!("{}: session opened", runtime.name());

        Ok(Self {
            vm,
            device,
            runtime,
        })
    }

    pub fn runtime(&self) -> &Arc<R> {
        &self.runtime
    }

    pub fn create_tensor(
        &self,
        data: &[u8],
        shape: &[i32],
        element_type: ElementType,
    ) -> Result<Handle<R, R::Tensor>, RuntimeError> {
        handle::create_tensor(&self.runtime, data, shape, element_type)
    }

    pub fn create_data_buffer(&self, bytes: &[u8]) -> Result<Handle<R, R::DataBuffer>, RuntimeError> {
        handle::create_data_buffer(&self.runtime, bytes)
    }

    /// Run `bytecode` against `inputs`.
    ///
    /// A non-OK status becomes `RuntimeError::Call`, and any outputs the
    /// runtime produced anyway are released.
    pub fn call(
        &self,
        bytecode: &Handle<R, R::DataBuffer>,
        inputs: &[&Handle<R, R::Tensor>],
    ) -> Result<Vec<Handle<R, R::Tensor>>, RuntimeError> {
        let raw_inputs: Vec<&R::Tensor> = inputs.iter().map(|input| &***input).collect();
        let (status, outputs) = self.runtime.call(&self.vm, &self.device, bytecode, &raw_inputs);

        let outputs: Vec<_> = outputs
            .into_iter()
            .map(|tensor| handle::adopt_tensor(&self.runtime, tensor))
            .collect();

        if !status.is_ok() {
            return Err(RuntimeError::Call(status));
        }
        Ok(outputs)
    }

    pub fn to_flat_array(&self, tensor: &Handle<R, R::Tensor>) -> Result<Vec<u8>, RuntimeError> {
        self.runtime.to_flat_array(tensor)
    }

    pub fn tensor_shape(&self, tensor: &Handle<R, R::Tensor>) -> Vec<i32> {
        self.runtime.tensor_shape(tensor)
    }

    /// Release the VM instance, then the device.
    pub fn close(self) {
        let Session { vm, device, runtime } = self;
        vm.release();
        device.release();
        log::debug!("{}: session closed", runtime.name());
    }
}
