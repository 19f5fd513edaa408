use crate::error::TensorError;
use crate::optim::Optimizer;

/// Adjusts the learning rates of an optimizer's parameter groups during
/// training. `step` is called once per epoch.
pub trait LRScheduler {
    fn step<O: Optimizer + ?Sized>(&mut self, optimizer: &mut O) -> Result<(), TensorError>;

    /// The learning rates set by the most recent `step`, one per group.
    fn get_last_lr(&self) -> &[f32];
}

/// Decays the learning rate of each parameter group by `gamma` every
/// `step_size` epochs.
#[derive(Debug, Clone)]
pub struct StepLR {
    step_size: usize,
    gamma: f32,
    last_epoch: usize,
    last_lrs: Vec<f32>,
}

impl StepLR {
    pub fn new(step_size: usize, gamma: f32) -> Result<Self, TensorError> {
        if step_size == 0 {
            return Err(TensorError::ConfigurationError(
                "StepLR: step_size cannot be zero".to_string(),
            ));
        }
        if gamma <= 0.0 {
            return Err(TensorError::ConfigurationError(
                "StepLR: gamma must be positive".to_string(),
            ));
        }
        Ok(StepLR {
            step_size,
            gamma,
            last_epoch: 0,
            last_lrs: Vec::new(),
        })
    }

    pub fn last_epoch(&self) -> usize {
        self.last_epoch
    }
}

impl LRScheduler for StepLR {
    fn step<O: Optimizer + ?Sized>(&mut self, optimizer: &mut O) -> Result<(), TensorError> {
        self.last_epoch += 1;
        let decay = self.last_epoch % self.step_size == 0;
        self.last_lrs.clear();
        for group in optimizer.param_groups_mut() {
            let lr = group
                .lr()
                .ok_or_else(|| TensorError::ConfigurationError("Missing LR".to_string()))?;
            let new_lr = if decay { lr * self.gamma } else { lr };
            if decay {
                log::debug!("StepLR epoch {}: lr {} -> {}", self.last_epoch, lr, new_lr);
            }
            group.set_lr(new_lr);
            self.last_lrs.push(new_lr);
        }
        Ok(())
    }

    fn get_last_lr(&self) -> &[f32] {
        &self.last_lrs
    }
}

#[cfg(test)]
#[path = "lr_scheduler_test.rs"]
mod tests;
