use crate::error::{Result, WarpError};

/// Channel of the flow field holding the column (horizontal) displacement.
pub const COL_CHANNEL: usize = 0;

/// Channel of the flow field holding the row (vertical) displacement.
///
/// Note the order: channel 1 moves along `H`, channel 0 along `W`. This is the
/// layout optical-flow extractors feeding this layer produce and must not be
/// swapped.
pub const ROW_CHANNEL: usize = 1;

/// Number of channels in a flow field.
pub const FLOW_CHANNELS: usize = 2;

/// Validated geometry of one warp: source `[N, C, H, W]` and flow `[N, 2, H, W]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WarpShape {
    pub num: usize,
    pub channels: usize,
    pub height: usize,
    pub width: usize,
}

impl WarpShape {
    /// Checks that `source` and `flow` shapes can be warped together.
    ///
    /// # Errors
    /// - [`WarpError::RankMismatch`] if either shape is not rank 4
    /// - [`WarpError::FlowChannels`] if the flow does not have 2 channels
    /// - [`WarpError::ShapeMismatch`] if batch, height or width differ
    pub fn from_inputs(source: &[usize], flow: &[usize]) -> Result<Self> {
        let &[num, channels, height, width] = source else {
            return Err(WarpError::RankMismatch {
                name: "source",
                shape: source.to_vec(),
            });
        };
        let &[flow_num, flow_channels, flow_height, flow_width] = flow else {
            return Err(WarpError::RankMismatch {
                name: "flow",
                shape: flow.to_vec(),
            });
        };
        if flow_channels != FLOW_CHANNELS {
            return Err(WarpError::FlowChannels(flow_channels));
        }
        if (flow_num, flow_height, flow_width) != (num, height, width) {
            return Err(WarpError::ShapeMismatch {
                expected: vec![num, FLOW_CHANNELS, height, width],
                actual: flow.to_vec(),
            });
        }
        Ok(Self {
            num,
            channels,
            height,
            width,
        })
    }

    /// Shape of the source and of the warped output.
    #[must_use]
    pub const fn source_shape(&self) -> [usize; 4] {
        [self.num, self.channels, self.height, self.width]
    }

    /// Shape of the flow field and of every cache tensor.
    #[must_use]
    pub const fn flow_shape(&self) -> [usize; 4] {
        [self.num, FLOW_CHANNELS, self.height, self.width]
    }

    /// Elements in one `H×W` plane.
    #[must_use]
    pub const fn plane(&self) -> usize {
        self.height * self.width
    }

    /// Elements of one batch entry of the flow (`2×H×W`).
    #[must_use]
    pub const fn flow_batch(&self) -> usize {
        FLOW_CHANNELS * self.plane()
    }

    /// Total elements of the source.
    #[must_use]
    pub const fn source_len(&self) -> usize {
        self.num * self.channels * self.plane()
    }

    /// Total elements of the flow.
    #[must_use]
    pub const fn flow_len(&self) -> usize {
        self.num * self.flow_batch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_matching_inputs() {
        let shape = WarpShape::from_inputs(&[2, 3, 4, 5], &[2, 2, 4, 5]).unwrap();
        assert_eq!(shape.source_shape(), [2, 3, 4, 5]);
        assert_eq!(shape.flow_shape(), [2, 2, 4, 5]);
        assert_eq!(shape.plane(), 20);
        assert_eq!(shape.source_len(), 120);
        assert_eq!(shape.flow_len(), 80);
    }

    #[test]
    fn rejects_spatial_mismatch() {
        let err = WarpShape::from_inputs(&[1, 1, 4, 5], &[1, 2, 4, 4]).unwrap_err();
        assert_eq!(
            err,
            WarpError::ShapeMismatch {
                expected: vec![1, 2, 4, 5],
                actual: vec![1, 2, 4, 4],
            }
        );
        assert!(WarpShape::from_inputs(&[1, 1, 4, 5], &[1, 2, 3, 5]).is_err());
        assert!(WarpShape::from_inputs(&[2, 1, 4, 5], &[1, 2, 4, 5]).is_err());
    }

    #[test]
    fn rejects_wrong_flow_channels() {
        assert_eq!(
            WarpShape::from_inputs(&[1, 3, 2, 2], &[1, 3, 2, 2]),
            Err(WarpError::FlowChannels(3))
        );
    }

    #[test]
    fn rejects_wrong_rank() {
        assert!(matches!(
            WarpShape::from_inputs(&[3, 2, 2], &[1, 2, 2, 2]),
            Err(WarpError::RankMismatch { name: "source", .. })
        ));
        assert!(matches!(
            WarpShape::from_inputs(&[1, 1, 2, 2], &[2, 2, 2]),
            Err(WarpError::RankMismatch { name: "flow", .. })
        ));
    }
}
