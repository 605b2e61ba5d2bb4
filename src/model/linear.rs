//! Trainable affine layer

use super::ParamInit;
use crate::autograd::{linear, Context};
use crate::Tensor;

/// `y = W x + b` with row-major `W: [out_features, in_features]`
#[derive(Debug, Clone)]
pub struct Linear {
    weight: Tensor,
    bias: Tensor,
    in_features: usize,
    out_features: usize,
}

impl Linear {
    /// Weights and bias drawn from `U(-1/sqrt(in), 1/sqrt(in))`
    pub fn new(in_features: usize, out_features: usize, init: &mut ParamInit) -> Self {
        let bound = 1.0 / (in_features.max(1) as f32).sqrt();
        Self {
            weight: init.uniform(in_features * out_features, bound),
            bias: init.uniform(out_features, bound),
            in_features,
            out_features,
        }
    }

    pub fn forward(&self, x: &Tensor, ctx: &Context) -> Tensor {
        linear(
            x,
            &ctx.view(&self.weight),
            &ctx.view(&self.bias),
            self.in_features,
            self.out_features,
        )
    }

    pub fn in_features(&self) -> usize {
        self.in_features
    }

    pub fn out_features(&self) -> usize {
        self.out_features
    }

    pub fn parameters(&self) -> Vec<&Tensor> {
        vec![&self.weight, &self.bias]
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.weight, &mut self.bias]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::{backward, sum};

    #[test]
    fn test_forward_shape_and_params() {
        let layer = Linear::new(3, 2, &mut ParamInit::seeded(0));
        let y = layer.forward(&Tensor::from_vec(vec![1.0, -1.0, 0.5], false), &Context::new());
        assert_eq!(y.len(), 2);
        assert_eq!(layer.parameters().len(), 2);
        assert_eq!(layer.parameters()[0].len(), 6);
    }

    #[test]
    fn test_inference_leaves_weights_untouched() {
        let layer = Linear::new(2, 2, &mut ParamInit::seeded(0));
        let x = Tensor::from_vec(vec![1.0, 2.0], false);

        let y = layer.forward(&x, &Context::inference());
        assert!(!y.requires_grad());

        let mut loss = sum(&layer.forward(&x, &Context::new()));
        backward(&mut loss, None);
        let grad = layer.parameters()[1].grad().expect("bias gradient");
        assert_eq!(grad.to_vec(), vec![1.0, 1.0]);
    }
}
