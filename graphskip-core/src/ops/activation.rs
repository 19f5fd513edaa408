//! Element-wise non-linearities.

use crate::autograd::{attach, needs_grad, BackwardOp};
use crate::error::TensorError;
use crate::tensor::Tensor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Activation {
    Relu,
    Sigmoid,
    Tanh,
    Exp,
    LogSigmoid,
}

fn sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// `log(sigmoid(x)) = min(x, 0) - log(1 + exp(-|x|))`, stable for large |x|.
fn log_sigmoid(x: f32) -> f32 {
    x.min(0.0) - (-x.abs()).exp().ln_1p()
}

impl Activation {
    fn forward(self, x: f32) -> f32 {
        match self {
            Activation::Relu => x.max(0.0),
            Activation::Sigmoid => sigmoid(x),
            Activation::Tanh => x.tanh(),
            Activation::Exp => x.exp(),
            Activation::LogSigmoid => log_sigmoid(x),
        }
    }

    /// d(output)/d(input) expressed through the input `x` and output `y`.
    fn derivative(self, x: f32, y: f32) -> f32 {
        match self {
            Activation::Relu => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::Sigmoid => y * (1.0 - y),
            Activation::Tanh => 1.0 - y * y,
            Activation::Exp => y,
            Activation::LogSigmoid => sigmoid(-x),
        }
    }
}

#[derive(Debug)]
struct ActivationBackward {
    kind: Activation,
    input: Tensor,
    output_values: Vec<f32>,
}

impl BackwardOp for ActivationBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Option<Tensor>>, TensorError> {
        let g = grad_output.get_f32_data()?;
        let x = self.input.get_f32_data()?;
        let grad: Vec<f32> = g
            .iter()
            .zip(x.iter().zip(&self.output_values))
            .map(|(gi, (xi, yi))| gi * self.kind.derivative(*xi, *yi))
            .collect();
        Ok(vec![Some(Tensor::new(grad, self.input.shape())?)])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

fn activation_op(input: &Tensor, kind: Activation) -> Result<Tensor, TensorError> {
    let out: Vec<f32> = input.get_f32_data()?.iter().map(|x| kind.forward(*x)).collect();
    let result = Tensor::new(out.clone(), input.shape())?;
    if needs_grad(&[input]) {
        attach(
            &result,
            ActivationBackward {
                kind,
                input: input.clone(),
                output_values: out,
            },
        );
    }
    Ok(result)
}

pub fn relu_op(input: &Tensor) -> Result<Tensor, TensorError> {
    activation_op(input, Activation::Relu)
}

pub fn sigmoid_op(input: &Tensor) -> Result<Tensor, TensorError> {
    activation_op(input, Activation::Sigmoid)
}

pub fn tanh_op(input: &Tensor) -> Result<Tensor, TensorError> {
    activation_op(input, Activation::Tanh)
}

pub fn exp_op(input: &Tensor) -> Result<Tensor, TensorError> {
    activation_op(input, Activation::Exp)
}

pub fn log_sigmoid_op(input: &Tensor) -> Result<Tensor, TensorError> {
    activation_op(input, Activation::LogSigmoid)
}

impl Tensor {
    /// Applies the Rectified Linear Unit element-wise: `max(0, x)`.
    pub fn relu(&self) -> Result<Tensor, TensorError> {
        relu_op(self)
    }

    pub fn sigmoid(&self) -> Result<Tensor, TensorError> {
        sigmoid_op(self)
    }

    pub fn tanh(&self) -> Result<Tensor, TensorError> {
        tanh_op(self)
    }

    pub fn exp(&self) -> Result<Tensor, TensorError> {
        exp_op(self)
    }

    /// `log(sigmoid(x))`, computed without overflow.
    pub fn log_sigmoid(&self) -> Result<Tensor, TensorError> {
        log_sigmoid_op(self)
    }
}

#[cfg(test)]
#[path = "activation_test.rs"]
mod tests;
