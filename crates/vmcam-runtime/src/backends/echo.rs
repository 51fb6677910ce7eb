use crate::{ElementType, Runtime, RuntimeError, Status};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Device,
    VmInstance,
    Tensor,
    DataBuffer,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandleCounts {
    pub created: usize,
    pub released: usize,
}

impl HandleCounts {
    pub fn live(&self) -> usize {
        self.created.saturating_sub(self.released)
    }
}

#[derive(Default)]
struct Counter {
    created: AtomicUsize,
    released: AtomicUsize,
}

impl Counter {
    fn create(&self) {
        self.created.fetch_add(1, Ordering::SeqCst);
    }

    fn release(&self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }

    fn snapshot(&self) -> HandleCounts {
        HandleCounts {
            created: self.created.load(Ordering::SeqCst),
            released: self.released.load(Ordering::SeqCst),
        }
    }
}

#[derive(Debug)]
pub struct EchoDevice;

#[derive(Debug)]
pub struct EchoVmInstance;

#[derive(Debug, Clone)]
pub struct EchoTensor {
    shape: Vec<i32>,
    element_type: ElementType,
    data: Vec<u8>,
}

#[derive(Debug)]
pub struct EchoDataBuffer {
    len: usize,
}

/// In-process runtime whose `call` returns a copy of each input tensor.
///
/// It keeps per-kind handle counters so leaks and double releases are
/// observable, and it can be told to fail upcoming calls or to take a fixed
/// time per call.
#[derive(Default)]
pub struct EchoRuntime {
    devices: Counter,
    vm_instances: Counter,
    tensors: Counter,
    data_buffers: Counter,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    latency: Option<Duration>,
    failures: Mutex<VecDeque<Status>>,
}

impl EchoRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call block for `latency` before returning.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queue `status` as the result of the next call that has not already
    /// been assigned a failure.
    pub fn inject_failure(&self, status: Status) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(status);
    }

    pub fn counts(&self, kind: HandleKind) -> HandleCounts {
        match kind {
            HandleKind::Device => self.devices.snapshot(),
            HandleKind::VmInstance => self.vm_instances.snapshot(),
            HandleKind::Tensor => self.tensors.snapshot(),
            HandleKind::DataBuffer => self.data_buffers.snapshot(),
        }
    }

    /// Handles of every kind that were created and not yet released.
    pub fn live_handles(&self) -> usize {
        [
            HandleKind::Device,
            HandleKind::VmInstance,
            HandleKind::Tensor,
            HandleKind::DataBuffer,
        ]
        .into_iter()
        .map(|kind| self.counts(kind).live())
        .sum()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls ever observed running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Runtime for EchoRuntime {
    type Device = EchoDevice;
    type VmInstance = EchoVmInstance;
    type Tensor = EchoTensor;
    type DataBuffer = EchoDataBuffer;

    fn name(&self) -> &str {
        "echo"
    }

    fn create_device(&self) -> Result<EchoDevice, RuntimeError> {
        self.devices.create();
        Ok(EchoDevice)
    }

    fn create_vm_instance(&self) -> Result<EchoVmInstance, RuntimeError> {
        self.vm_instances.create();
        Ok(EchoVmInstance)
    }

    fn create_tensor(
        &self,
        data: &[u8],
        shape: &[i32],
        element_type: ElementType,
    ) -> Result<EchoTensor, RuntimeError> {
        let mut count: usize = 1;
        for &dim in shape {
            let dim = usize::try_from(dim)
                .map_err(|_| RuntimeError::Tensor(format!("negative dimension in {shape:?}")))?;
            count = count
                .checked_mul(dim)
                .ok_or_else(|| RuntimeError::Tensor(format!("shape {shape:?} overflows")))?;
        }

        let expected = count * element_type.size_in_bytes();
        if expected != data.len() {
            return Err(RuntimeError::Tensor(format!(
                "shape {shape:?} of {element_type} needs {expected} bytes, got {}",
                data.len()
            )));
        }

        self.tensors.create();
        Ok(EchoTensor {
            shape: shape.to_vec(),
            element_type,
            data: data.to_vec(),
        })
    }

    fn create_data_buffer(&self, bytes: &[u8]) -> Result<EchoDataBuffer, RuntimeError> {
        self.data_buffers.create();
        Ok(EchoDataBuffer { len: bytes.len() })
    }

    fn call(
        &self,
        _vm: &EchoVmInstance,
        _device: &EchoDevice,
        bytecode: &EchoDataBuffer,
        inputs: &[&EchoTensor],
    ) -> (Status, Vec<EchoTensor>) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }

        let injected = self
            .failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        let result = match injected {
            Some(status) => (status, Vec::new()),
            None => {
                log::trace!("echo: {} inputs, {} bytes of bytecode", inputs.len(), bytecode.len);
                let outputs: Vec<EchoTensor> = inputs.iter().map(|&input| input.clone()).collect();
                for _ in &outputs {
                    self.tensors.create();
                }
                (Status::ok(), outputs)
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn to_flat_array(&self, tensor: &EchoTensor) -> Result<Vec<u8>, RuntimeError> {
        match tensor.element_type {
            ElementType::U8 => Ok(tensor.data.clone()),
            other => Err(RuntimeError::UnsupportedType(other.tag().to_string())),
        }
    }

    fn tensor_shape(&self, tensor: &EchoTensor) -> Vec<i32> {
        tensor.shape.clone()
    }

    fn release_device(&self, _device: EchoDevice) {
        self.devices.release();
    }

    fn release_vm_instance(&self, _vm: EchoVmInstance) {
        self.vm_instances.release();
    }

    fn release_tensor(&self, _tensor: EchoTensor) {
        self.tensors.release();
    }

    fn release_data_buffer(&self, _buffer: EchoDataBuffer) {
        self.data_buffers.release();
    }
}
