use crate::autograd::no_grad;
use crate::error::TensorError;
use crate::nn::parameter::Parameter;
use crate::optim::{Optimizer, ParamGroup};
use std::collections::HashMap;

/// Per-parameter moment estimates.
#[derive(Default, Clone, Debug)]
pub struct AdamParamState {
    /// First moment (exponential moving average of gradients).
    pub m: Vec<f32>,
    /// Second moment (exponential moving average of squared gradients).
    pub v: Vec<f32>,
    /// Running maximum of `v_hat`, only used with AMSGrad.
    pub v_max: Vec<f32>,
}

/// Adam optimizer with optional L2 weight decay and AMSGrad.
#[derive(Debug)]
pub struct AdamOptimizer {
    param_groups: Vec<ParamGroup>,
    iterations: u64,
    state: HashMap<usize, AdamParamState>,
}

impl AdamOptimizer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        params: Vec<Parameter>,
        lr: f32,
        beta1: f32,
        beta2: f32,
        eps: f32,
        weight_decay: f32,
        amsgrad: bool,
    ) -> Result<Self, TensorError> {
        if lr <= 0.0 {
            return Err(TensorError::ConfigurationError(
                "Learning rate must be positive".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&beta1) {
            return Err(TensorError::ConfigurationError(
                "Beta1 must be in [0, 1)".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&beta2) {
            return Err(TensorError::ConfigurationError(
                "Beta2 must be in [0, 1)".to_string(),
            ));
        }
        if eps <= 0.0 {
            return Err(TensorError::ConfigurationError(
                "Epsilon must be positive".to_string(),
            ));
        }
        if weight_decay < 0.0 {
            return Err(TensorError::ConfigurationError(
                "Weight decay must be non-negative".to_string(),
            ));
        }

        let mut initial_group = ParamGroup::new(params);
        initial_group.options.lr = Some(lr);
        initial_group.options.betas = Some((beta1, beta2));
        initial_group.options.eps = Some(eps);
        initial_group.options.weight_decay = Some(weight_decay);
        initial_group.options.amsgrad = Some(amsgrad);

        Ok(AdamOptimizer {
            param_groups: vec![initial_group],
            iterations: 0,
            state: HashMap::new(),
        })
    }

    /// Adam with the usual defaults: betas `(0.9, 0.999)`, eps `1e-8`, no decay.
    pub fn with_lr(params: Vec<Parameter>, lr: f32) -> Result<Self, TensorError> {
        Self::new(params, lr, 0.9, 0.999, 1e-8, 0.0, false)
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }
}

impl Optimizer for AdamOptimizer {
    fn step(&mut self) -> Result<(), TensorError> {
        let _guard = no_grad();
        self.iterations += 1;
        let t = self.iterations as i32;

        for group in &self.param_groups {
            let lr = group
                .options
                .lr
                .ok_or_else(|| TensorError::ConfigurationError("Missing LR".to_string()))?;
            let (beta1, beta2) = group.options.betas.unwrap_or((0.9, 0.999));
            let eps = group.options.eps.unwrap_or(1e-8);
            let weight_decay = group.options.weight_decay.unwrap_or(0.0);
            let amsgrad = group.options.amsgrad.unwrap_or(false);

            let bias_correction1 = 1.0 - beta1.powi(t);
            let bias_correction2 = 1.0 - beta2.powi(t);

            for param in &group.params {
                let grad = match param.grad() {
                    Some(g) => g.get_f32_data()?,
                    None => continue,
                };
                let values = param.get_f32_data()?;
                let numel = values.len();
                let state = self
                    .state
                    .entry(param.node_id())
                    .or_insert_with(|| AdamParamState {
                        m: vec![0.0; numel],
                        v: vec![0.0; numel],
                        v_max: if amsgrad { vec![0.0; numel] } else { Vec::new() },
                    });

                let mut updated = values.clone();
                for i in 0..numel {
                    let g = grad[i] + weight_decay * values[i];
                    state.m[i] = beta1 * state.m[i] + (1.0 - beta1) * g;
                    state.v[i] = beta2 * state.v[i] + (1.0 - beta2) * g * g;
                    let m_hat = state.m[i] / bias_correction1;
                    let mut v_hat = state.v[i] / bias_correction2;
                    if amsgrad {
                        state.v_max[i] = state.v_max[i].max(v_hat);
                        v_hat = state.v_max[i];
                    }
                    updated[i] -= lr * m_hat / (v_hat.sqrt() + eps);
                }
                param.copy_from_slice(&updated)?;
            }
        }
        Ok(())
    }

    fn add_param_group(&mut self, mut param_group: ParamGroup) {
        let defaults = self.param_groups[0].options.clone();
        let opts = &mut param_group.options;
        opts.lr = opts.lr.or(defaults.lr);
        opts.betas = opts.betas.or(defaults.betas);
        opts.eps = opts.eps.or(defaults.eps);
        opts.weight_decay = opts.weight_decay.or(defaults.weight_decay);
        opts.amsgrad = opts.amsgrad.or(defaults.amsgrad);
        self.param_groups.push(param_group);
    }

    fn param_groups(&self) -> &[ParamGroup] {
        &self.param_groups
    }

    fn param_groups_mut(&mut self) -> &mut [ParamGroup] {
        &mut self.param_groups
    }
}

#[cfg(test)]
#[path = "adam_test.rs"]
mod tests;
