use super::param_group::ParamGroup;
use crate::error::TensorError;

/// Trait defining the common interface for all optimizers.
///
/// Optimizers are responsible for updating model parameters based on their gradients.
pub trait Optimizer {
    /// Performs a single optimization step using the accumulated gradients.
    fn step(&mut self) -> Result<(), TensorError>;

    /// Clears the gradients of all parameters managed by the optimizer.
    fn zero_grad(&mut self) {
        for group in self.param_groups() {
            for param in &group.params {
                param.clear_grad();
            }
        }
    }

    /// Adds a new parameter group, allowing different hyperparameters for
    /// different sets of parameters.
    fn add_param_group(&mut self, param_group: ParamGroup);

    fn param_groups(&self) -> &[ParamGroup];

    /// Mutable access to the groups, used by schedulers to change the learning rate.
    fn param_groups_mut(&mut self) -> &mut [ParamGroup];
}
