use crate::{ElementType, RuntimeError, Status};

/// The runtime's binding surface.
///
/// Every handle type is owned by the runtime and is not reclaimed
/// automatically: whatever a `create_*` method returns must come back through
/// the matching `release_*` method exactly once. Wrap handles in
/// [`Handle`](crate::Handle) rather than calling `release_*` by hand.
pub trait Runtime: Send + Sync + 'static {
    type Device: Send + Sync;
    type VmInstance: Send + Sync;
    type Tensor: Send + Sync;
    type DataBuffer: Send + Sync;

    fn name(&self) -> &str;

    fn create_device(&self) -> Result<Self::Device, RuntimeError>;

    fn create_vm_instance(&self) -> Result<Self::VmInstance, RuntimeError>;

    /// Wrap `data` as a tensor of `shape` and `element_type`.
    ///
    /// `data.len()` must equal the shape's element count times the element size.
    fn create_tensor(
        &self,
        data: &[u8],
        shape: &[i32],
        element_type: ElementType,
    ) -> Result<Self::Tensor, RuntimeError>;

    /// Copy a bytecode program into a runtime-owned buffer.
    fn create_data_buffer(&self, bytes: &[u8]) -> Result<Self::DataBuffer, RuntimeError>;

    /// Execute `bytecode` on `vm` and `device` against `inputs`.
    ///
    /// Output tensors are owned by the caller. On a non-OK status the output
    /// list is empty.
    fn call(
        &self,
        vm: &Self::VmInstance,
        device: &Self::Device,
        bytecode: &Self::DataBuffer,
        inputs: &[&Self::Tensor],
    ) -> (Status, Vec<Self::Tensor>);

    /// Element values of `tensor`, row-major, one byte per element.
    fn to_flat_array(&self, tensor: &Self::Tensor) -> Result<Vec<u8>, RuntimeError>;

    fn tensor_shape(&self, tensor: &Self::Tensor) -> Vec<i32>;

    fn release_device(&self, device: Self::Device);

    fn release_vm_instance(&self, vm: Self::VmInstance);

    fn release_tensor(&self, tensor: Self::Tensor);

    fn release_data_buffer(&self, buffer: Self::DataBuffer);
}
