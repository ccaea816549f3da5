mod common;

use briny_warp::backend::{get_backend, set_backend, Backend};
use briny_warp::ops::dispatch::{warp_backward, warp_forward};
use briny_warp::ops::{cpu, serial};
use briny_warp::tensors::Ten64;
use briny_warp::warp::{BoundaryPolicy, WarpShape};
use common::*;

fn run(backend: Backend, f: &Fixture, policy: BoundaryPolicy) -> [Ten64; 3] {
    set_backend(backend);
    let (out, cache) = warp_forward(&f.source, &f.flow, policy).unwrap();
    let grad = Ten64::new(out.shape.clone(), (0..out.len()).map(|i| (i % 7) as f64 - 3.0).collect());
    let (source_grad, flow_grad) = warp_backward(&grad, &f.source, &cache).unwrap();
    [out, source_grad, flow_grad]
}

#[test]
fn test_serial_and_parallel_agree_bitwise() {
    let mut rng = seeded(2024);
    for shape in [[1, 1, 4, 5], [3, 4, 6, 7], [2, 3, 1, 9], [1, 2, 8, 1]] {
        let f = random_pair(&mut rng, shape, 0.0);
        for policy in [BoundaryPolicy::Nearest, BoundaryPolicy::Truncate] {
            let parallel = run(Backend::Cpu, &f, policy);
            let serial = run(Backend::Serial, &f, policy);
            assert_eq!(parallel, serial, "{policy} on {shape:?}");
        }
    }
    set_backend(Backend::Cpu);
    assert_eq!(get_backend(), Backend::Cpu);
}

#[test]
fn test_empty_tensors() {
    for shape in [[0, 3, 4, 5], [2, 0, 4, 5], [1, 1, 0, 5], [1, 1, 4, 0]] {
        let [n, c, h, w] = shape;
        let source = Ten64::zeros(vec![n, c, h, w]);
        let flow = Ten64::zeros(vec![n, 2, h, w]);
        for policy in [BoundaryPolicy::Nearest, BoundaryPolicy::Truncate] {
            let (out, cache) = warp_forward(&source, &flow, policy).unwrap();
            assert!(out.is_empty());
            let (sg, fg) = warp_backward(&out, &source, &cache).unwrap();
            assert_eq!(sg.shape, source.shape);
            assert_eq!(fg.shape, flow.shape);
        }
    }
}

#[test]
fn test_backend_from_discriminant() {
    assert_eq!(Backend::try_from(0), Ok(Backend::Cpu));
    assert_eq!(Backend::try_from(1), Ok(Backend::Serial));
    assert_eq!(Backend::try_from(9), Err(()));
}

fn small_shape() -> WarpShape {
    WarpShape::from_inputs(&[1, 1, 2, 3], &[1, 2, 2, 3]).unwrap()
}

#[test]
#[should_panic(expected = "flow does not match warp shape")]
fn test_cpu_forward_panics_on_short_flow() {
    let source = Ten64::zeros(vec![1, 1, 2, 3]);
    let flow = Ten64::zeros(vec![1, 2, 2, 2]);
    let _ = cpu::warp_forward(&small_shape(), BoundaryPolicy::Nearest, &source, &flow);
}

#[test]
#[should_panic(expected = "source does not match warp shape")]
fn test_serial_forward_panics_on_long_source() {
    let source = Ten64::zeros(vec![1, 2, 2, 3]);
    let flow = Ten64::zeros(vec![1, 2, 2, 3]);
    let _ = serial::warp_forward(&small_shape(), BoundaryPolicy::Truncate, &source, &flow);
}

#[test]
#[should_panic(expected = "output gradient does not match warp shape")]
fn test_cpu_backward_panics_on_short_gradient() {
    let source = Ten64::zeros(vec![1, 1, 2, 3]);
    let flow = Ten64::zeros(vec![1, 2, 2, 3]);
    let (_, cache) = cpu::warp_forward(&small_shape(), BoundaryPolicy::Nearest, &source, &flow);
    let grad = Ten64::zeros(vec![1, 1, 2, 2]);
    let _ = cpu::warp_backward(&small_shape(), &grad, &source, &cache);
}

#[test]
#[should_panic(expected = "cache was filled for another shape")]
fn test_serial_backward_panics_on_foreign_cache() {
    let shape = WarpShape::from_inputs(&[1, 1, 3, 2], &[1, 2, 3, 2]).unwrap();
    let source = Ten64::zeros(vec![1, 1, 3, 2]);
    let (_, cache) = serial::warp_forward(&shape, BoundaryPolicy::Nearest, &source, &Ten64::zeros(vec![1, 2, 3, 2]));
    // same lengths, different geometry
    let _ = serial::warp_backward(&small_shape(), &source, &source, &cache);
}
