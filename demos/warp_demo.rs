//! Recovers a constant sub-pixel shift by gradient descent on the flow field.
//!
//! Run with `cargo run --example warp_demo`.

use briny_warp::backprop::warp;
use briny_warp::ops::dispatch::warp_forward;
use briny_warp::tensors::{Ten64, WithGrad};
use briny_warp::warp::{BoundaryPolicy, COL_CHANNEL, ROW_CHANNEL};

const H: usize = 8;
const W: usize = 8;
const TRUE_SHIFT: [f64; 2] = [0.35, -0.25]; // [col, row]

fn shifted_flow(col: f64, row: f64) -> Ten64 {
    let mut data = vec![0.0; 2 * H * W];
    data[COL_CHANNEL * H * W..(COL_CHANNEL + 1) * H * W].fill(col);
    data[ROW_CHANNEL * H * W..(ROW_CHANNEL + 1) * H * W].fill(row);
    Ten64::new(vec![1, 2, H, W], data)
}

fn main() {
    let policy = BoundaryPolicy::Nearest;
    let image: Vec<f64> = (0..H * W)
        .map(|i| {
            let (h, w) = ((i / W) as f64, (i % W) as f64);
            (0.7 * h).sin() + (0.9 * w).cos()
        })
        .collect();
    let source = WithGrad::new(Ten64::new(vec![1, 1, H, W], image));

    let (target, _) = warp_forward(
        &source.value,
        &shifted_flow(TRUE_SHIFT[0], TRUE_SHIFT[1]),
        policy,
    )
    .unwrap();

    let mut flow = WithGrad::new(shifted_flow(0.1, 0.1));
    let lr = 0.2;

    for step in 0..=200 {
        let (out, back) = warp(&source, &flow, policy).unwrap();

        // squared error summed over pixels
        let diff: Vec<f64> = out.data.iter().zip(&target.data).map(|(o, t)| o - t).collect();
        let loss = diff.iter().map(|d| d * d).sum::<f64>();
        let grad_out = Ten64::new(out.shape.clone(), diff.iter().map(|d| 2.0 * d).collect());

        let (_, grad_flow) = back(&grad_out);
        for (f, g) in flow.value.data.iter_mut().zip(&grad_flow.data) {
            *f -= lr * g;
        }

        if step % 20 == 0 {
            let mean = |c: usize| {
                flow.value.data[c * H * W..(c + 1) * H * W].iter().sum::<f64>() / (H * W) as f64
            };
            println!(
                "step {step:>3}: loss={loss:.6}, mean flow col={:.4} row={:.4}",
                mean(COL_CHANNEL),
                mean(ROW_CHANNEL)
            );
        }
    }

    println!("target shift col={} row={}", TRUE_SHIFT[0], TRUE_SHIFT[1]);
}
