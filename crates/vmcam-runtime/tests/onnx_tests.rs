#![cfg(feature = "onnx")]

use vmcam_runtime::{Device, ElementType, OnnxRuntime, Runtime};

#[test]
fn test_onnx_runtime_name() {
    assert_eq!(OnnxRuntime::new(Device::Cpu).name(), "onnx");
}

#[test]
fn test_onnx_tensor_round_trip_u8() {
    let runtime = OnnxRuntime::new(Device::Cpu);
    let tensor = runtime
        .create_tensor(&[1, 2, 3, 4, 5, 6, 7, 8], &[1, 2, 4], ElementType::U8)
        .unwrap();
    assert_eq!(runtime.tensor_shape(&tensor), vec![1, 2, 4]);
    assert_eq!(runtime.to_flat_array(&tensor).unwrap(), vec![1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn test_onnx_f32_flat_array_clamps() {
    let runtime = OnnxRuntime::new(Device::Cpu);
    let bytes: Vec<u8> = [-3.0f32, 127.6, 300.0]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();
    let tensor = runtime.create_tensor(&bytes, &[3], ElementType::F32).unwrap();
    assert_eq!(runtime.to_flat_array(&tensor).unwrap(), vec![0, 128, 255]);
}

#[test]
fn test_onnx_rejects_garbage_model() {
    let runtime = OnnxRuntime::new(Device::Cpu);
    let device = runtime.create_device().unwrap();
    let vm = runtime.create_vm_instance().unwrap();
    let bytecode = runtime.create_data_buffer(b"not a model").unwrap();
    let input = runtime.create_tensor(&[0u8; 4], &[1, 1, 4], ElementType::U8).unwrap();

    let (status, outputs) = runtime.call(&vm, &device, &bytecode, &[&input]);
    assert!(!status.is_ok());
    assert!(outputs.is_empty());
}
