mod common;

use briny_warp::error::WarpError;
use briny_warp::layer::WarpLayer;
use briny_warp::ops::dispatch::{warp_backward, warp_forward};
use briny_warp::param::WarpParam;
use briny_warp::tensors::{Ten64, WithGrad};
use briny_warp::warp::BoundaryPolicy;
use common::*;

fn ready(policy: BoundaryPolicy, f: &Fixture) -> WarpLayer {
    let mut layer = WarpLayer::new(policy.into());
    layer.setup(&f.source, &f.flow).unwrap();
    layer
}

fn filled(t: &Ten64, value: f64) -> WithGrad<Ten64> {
    let mut wg = WithGrad::new(t.clone());
    wg.grad.data.fill(value);
    wg
}

#[test]
fn test_setup_rejects_mismatched_inputs() {
    let mut layer = WarpLayer::default();
    let source = Ten64::zeros(vec![2, 3, 4, 5]);

    let err = layer.setup(&source, &Ten64::zeros(vec![2, 2, 4, 4])).unwrap_err();
    assert_eq!(
        err,
        WarpError::ShapeMismatch {
            expected: vec![2, 2, 4, 5],
            actual: vec![2, 2, 4, 4],
        }
    );
    assert!(matches!(
        layer.setup(&source, &Ten64::zeros(vec![1, 2, 4, 5])),
        Err(WarpError::ShapeMismatch { .. })
    ));
    assert_eq!(
        layer.setup(&source, &Ten64::zeros(vec![2, 1, 4, 5])),
        Err(WarpError::FlowChannels(1))
    );
    assert!(matches!(
        layer.setup(&Ten64::zeros(vec![3, 4, 5]), &Ten64::zeros(vec![2, 2, 4, 5])),
        Err(WarpError::RankMismatch { .. })
    ));
    assert!(layer.shape().is_none());
}

#[test]
fn test_layer_before_setup() {
    let f = fixture_d();
    let mut layer = WarpLayer::default();
    assert_eq!(layer.reshape(&f.source, &f.flow), Err(WarpError::NotSetUp));

    let (_, cache) = warp_forward(&f.source, &f.flow, BoundaryPolicy::Nearest).unwrap();
    let mut source = WithGrad::new(f.source.clone());
    let mut flow = WithGrad::new(f.flow.clone());
    let err = layer
        .backward(&f.source, &cache, &mut source, &mut flow, [true, true])
        .unwrap_err();
    assert_eq!(err, WarpError::NotSetUp);
}

#[test]
fn test_forward_matches_dispatch() {
    for policy in [BoundaryPolicy::Nearest, BoundaryPolicy::Truncate] {
        let f = fixture_a();
        let layer = ready(policy, &f);
        let (top, cache) = layer.forward(&f.source, &f.flow).unwrap();
        let (expected, expected_cache) = warp_forward(&f.source, &f.flow, policy).unwrap();
        assert_eq!(top, expected);
        assert_eq!(cache, expected_cache);
        assert_eq!(cache.policy(), policy);
    }
}

#[test]
fn test_backward_honours_propagate_down() {
    let f = fixture_b();
    let layer = ready(BoundaryPolicy::Nearest, &f);
    let (top, cache) = layer.forward(&f.source, &f.flow).unwrap();
    let top_grad = Ten64::new(top.shape.clone(), (0..12).map(|i| f64::from(i) - 5.0).collect());
    let (source_grad, flow_grad) = warp_backward(&top_grad, &f.source, &cache).unwrap();

    let mut source = filled(&f.source, 7.0);
    let mut flow = filled(&f.flow, 7.0);
    layer
        .backward(&top_grad, &cache, &mut source, &mut flow, [false, false])
        .unwrap();
    assert!(source.grad.data.iter().chain(&flow.grad.data).all(|&g| g == 7.0));

    layer
        .backward(&top_grad, &cache, &mut source, &mut flow, [true, false])
        .unwrap();
    assert_eq!(source.grad, source_grad);
    assert!(flow.grad.data.iter().all(|&g| g == 7.0));

    let mut source = filled(&f.source, 7.0);
    layer
        .backward(&top_grad, &cache, &mut source, &mut flow, [false, true])
        .unwrap();
    assert!(source.grad.data.iter().all(|&g| g == 7.0));
    assert_eq!(flow.grad, flow_grad);

    let mut source = filled(&f.source, 7.0);
    let mut flow = filled(&f.flow, 7.0);
    layer
        .backward(&top_grad, &cache, &mut source, &mut flow, [true, true])
        .unwrap();
    assert_eq!(source.grad, source_grad);
    assert_eq!(flow.grad, flow_grad);
}

#[test]
fn test_backward_rejects_stale_cache() {
    let f = fixture_d();
    let mut layer = ready(BoundaryPolicy::Truncate, &f);
    let (top, cache) = layer.forward(&f.source, &f.flow).unwrap();

    let g = fixture_e();
    layer.reshape(&g.source, &g.flow).unwrap();
    let mut source = WithGrad::new(g.source.clone());
    let mut flow = WithGrad::new(g.flow.clone());
    let top_grad = g.source.zeros_like();
    assert!(matches!(
        layer.backward(&top_grad, &cache, &mut source, &mut flow, [true, true]),
        Err(WarpError::CacheMismatch(_))
    ));

    // old inputs no longer match the reshaped layer
    let mut source = WithGrad::new(f.source.clone());
    let mut flow = WithGrad::new(f.flow.clone());
    assert!(matches!(
        layer.backward(&top, &cache, &mut source, &mut flow, [true, false]),
        Err(WarpError::ShapeChanged { .. })
    ));
}

#[test]
fn test_backward_rejects_wrong_top_grad() {
    let f = fixture_e();
    let layer = ready(BoundaryPolicy::Nearest, &f);
    let (_, cache) = layer.forward(&f.source, &f.flow).unwrap();
    let mut source = WithGrad::new(f.source.clone());
    let mut flow = WithGrad::new(f.flow.clone());
    let top_grad = Ten64::zeros(vec![1, 1, 3, 2]);
    assert!(matches!(
        layer.backward(&top_grad, &cache, &mut source, &mut flow, [true, true]),
        Err(WarpError::CacheMismatch(_))
    ));
}

#[test]
fn test_layer_from_text_param() {
    let param: WarpParam = "outliers: TRUNCATE".parse().unwrap();
    let f = fixture_b();
    let mut layer = WarpLayer::new(param);
    layer.setup(&f.source, &f.flow).unwrap();
    let (top, _) = layer.forward(&f.source, &f.flow).unwrap();
    assert_eq!(top.data[3], 0.0);
    assert_eq!(layer.param(), param);
}
