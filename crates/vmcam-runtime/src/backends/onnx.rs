use crate::{Device, ElementType, Runtime, RuntimeError, Status, StatusCode};
use ndarray::{ArrayD, IxDyn};
use ort::{inputs, session::Session as OrtSession, value::TensorRef};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

/// Runtime backed by ONNX Runtime.
///
/// The bytecode handed to `call` is a serialized ONNX model. A VM instance
/// keeps the session built from the last model it ran, so running the same
/// bytecode every tick loads it only once.
pub struct OnnxRuntime {
    device: Device,
}

impl OnnxRuntime {
    pub fn new(device: Device) -> Self {
        Self { device }
    }
}

pub struct OnnxDevice {
    device: Device,
}

pub struct OnnxVmInstance {
    loaded: Mutex<Option<LoadedProgram>>,
}

struct LoadedProgram {
    fingerprint: u64,
    session: OrtSession,
    input_name: String,
    output_names: Vec<String>,
}

pub struct OnnxDataBuffer {
    bytes: Vec<u8>,
    fingerprint: u64,
}

pub enum OnnxTensor {
    U8(ArrayD<u8>),
    F32(ArrayD<f32>),
}

fn fingerprint(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}

fn load_program(device: &Device, buffer: &OnnxDataBuffer) -> Result<LoadedProgram, Status> {
    let internal = |msg: String| Status::error(StatusCode::Internal, msg);

    let mut builder = OrtSession::builder()
        .map_err(|e| internal(format!("failed to create session builder: {e}")))?;

    builder = match device {
        Device::Cpu => builder,
        #[cfg(feature = "cuda")]
        Device::Cuda { device_id } => {
            use ort::execution_providers::CUDAExecutionProvider;
            let ep = CUDAExecutionProvider::default().with_device_id(*device_id);
            builder
                .with_execution_providers([ep.build()])
                .map_err(|e| Status::error(StatusCode::Unavailable, e.to_string()))?
        }
        #[cfg(not(feature = "cuda"))]
        Device::Cuda { .. } => {
            return Err(Status::error(
                StatusCode::Unimplemented,
                format!("{device} requires the cuda feature"),
            ));
        }
    };

    let session = builder
        .commit_from_memory(&buffer.bytes)
        .map_err(|e| Status::error(StatusCode::InvalidArgument, format!("bad model: {e}")))?;

    let input_name = session
        .inputs()
        .first()
        .map(|input| input.name().to_string())
        .ok_or_else(|| Status::error(StatusCode::InvalidArgument, "model has no inputs"))?;
    let output_names = session
        .outputs()
        .iter()
        .map(|output| output.name().to_string())
        .collect();

    log::info!("onnx: loaded {} byte model on {device}", buffer.bytes.len());

    Ok(LoadedProgram {
        fingerprint: buffer.fingerprint,
        session,
        input_name,
        output_names,
    })
}

fn run_program(program: &mut LoadedProgram, input: &OnnxTensor) -> Result<Vec<OnnxTensor>, Status> {
    let internal = |msg: String| Status::error(StatusCode::Internal, msg);

    let name = program.input_name.as_str();
    let outputs = match input {
        OnnxTensor::U8(array) => {
            let tensor = TensorRef::from_array_view(array.view())
                .map_err(|e| internal(format!("failed to create tensor ref: {e}")))?;
            program.session.run(inputs![name => tensor])
        }
        OnnxTensor::F32(array) => {
            let tensor = TensorRef::from_array_view(array.view())
                .map_err(|e| internal(format!("failed to create tensor ref: {e}")))?;
            program.session.run(inputs![name => tensor])
        }
    }
    .map_err(|e| internal(format!("inference failed: {e}")))?;

    let mut results = Vec::with_capacity(program.output_names.len());
    for output_name in &program.output_names {
        let value = &outputs[output_name.as_str()];
        let tensor = if let Ok(array) = value.try_extract_array::<u8>() {
            OnnxTensor::U8(array.to_owned())
        } else {
            let array = value.try_extract_array::<f32>().map_err(|e| {
                Status::error(
                    StatusCode::Unimplemented,
                    format!("output '{output_name}' is neither u8 nor f32: {e}"),
                )
            })?;
            OnnxTensor::F32(array.to_owned())
        };
        results.push(tensor);
    }

    Ok(results)
}

impl Runtime for OnnxRuntime {
    type Device = OnnxDevice;
    type VmInstance = OnnxVmInstance;
    type Tensor = OnnxTensor;
    type DataBuffer = OnnxDataBuffer;

    fn name(&self) -> &str {
        "onnx"
    }

    fn create_device(&self) -> Result<OnnxDevice, RuntimeError> {
        Ok(OnnxDevice {
            device: self.device.clone(),
        })
    }

    fn create_vm_instance(&self) -> Result<OnnxVmInstance, RuntimeError> {
        Ok(OnnxVmInstance {
            loaded: Mutex::new(None),
        })
    }

    fn create_tensor(
        &self,
        data: &[u8],
        shape: &[i32],
        element_type: ElementType,
    ) -> Result<OnnxTensor, RuntimeError> {
        let dims = shape
            .iter()
            .map(|&dim| usize::try_from(dim))
            .collect::<Result<Vec<usize>, _>>()
            .map_err(|_| RuntimeError::Tensor(format!("negative dimension in {shape:?}")))?;
        let bad_shape = |e: ndarray::ShapeError| RuntimeError::Tensor(format!("{shape:?}: {e}"));

        match element_type {
            ElementType::U8 => Ok(OnnxTensor::U8(
                ArrayD::from_shape_vec(IxDyn(&dims), data.to_vec()).map_err(bad_shape)?,
            )),
            ElementType::F32 => {
                let values = data
                    .chunks_exact(4)
                    .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                    .collect();
                Ok(OnnxTensor::F32(
                    ArrayD::from_shape_vec(IxDyn(&dims), values).map_err(bad_shape)?,
                ))
            }
            other => Err(RuntimeError::UnsupportedType(other.tag().to_string())),
        }
    }

    fn create_data_buffer(&self, bytes: &[u8]) -> Result<OnnxDataBuffer, RuntimeError> {
        Ok(OnnxDataBuffer {
            fingerprint: fingerprint(bytes),
            bytes: bytes.to_vec(),
        })
    }

    fn call(
        &self,
        vm: &OnnxVmInstance,
        device: &OnnxDevice,
        bytecode: &OnnxDataBuffer,
        inputs: &[&OnnxTensor],
    ) -> (Status, Vec<OnnxTensor>) {
        let [input] = inputs else {
            return (
                Status::error(
                    StatusCode::InvalidArgument,
                    format!("expected 1 input, got {}", inputs.len()),
                ),
                Vec::new(),
            );
        };

        let mut loaded = vm.loaded.lock().unwrap_or_else(|e| e.into_inner());
        let stale = loaded
            .as_ref()
            .is_none_or(|program| program.fingerprint != bytecode.fingerprint);
        if stale {
            match load_program(&device.device, bytecode) {
                Ok(program) => *loaded = Some(program),
                Err(status) => return (status, Vec::new()),
            }
        }

        let Some(program) = loaded.as_mut() else {
            return (
                Status::error(StatusCode::FailedPrecondition, "no program loaded"),
                Vec::new(),
            );
        };

        match run_program(program, input) {
            Ok(outputs) => (Status::ok(), outputs),
            Err(status) => (status, Vec::new()),
        }
    }

    /// `u8` tensors are returned as-is; `f32` tensors are rounded and clamped
    /// to `0..=255`.
    fn to_flat_array(&self, tensor: &OnnxTensor) -> Result<Vec<u8>, RuntimeError> {
        Ok(match tensor {
            OnnxTensor::U8(array) => array.iter().copied().collect(),
            OnnxTensor::F32(array) => array
                .iter()
                .map(|&v| v.round().clamp(0.0, 255.0) as u8)
                .collect(),
        })
    }

    fn tensor_shape(&self, tensor: &OnnxTensor) -> Vec<i32> {
        let shape = match tensor {
            OnnxTensor::U8(array) => array.shape(),
            OnnxTensor::F32(array) => array.shape(),
        };
        shape.iter().map(|&dim| dim as i32).collect()
    }

    fn release_device(&self, _device: OnnxDevice) {}

    fn release_vm_instance(&self, vm: OnnxVmInstance) {
        drop(vm);
        log::debug!("onnx: vm instance released");
    }

    fn release_tensor(&self, _tensor: OnnxTensor) {}

    fn release_data_buffer(&self, _buffer: OnnxDataBuffer) {}
}
