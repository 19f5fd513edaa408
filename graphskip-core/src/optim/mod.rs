//! Optimizers for training: the `Optimizer` trait, parameter groups, Adam,
//! learning-rate scheduling and gradient clipping.

pub mod adam;
pub mod grad_clipping;
pub mod lr_scheduler;
pub mod optimizer_trait;
pub mod param_group;

pub use adam::AdamOptimizer;
pub use grad_clipping::{clip_grad_norm_, clip_grad_value_};
pub use lr_scheduler::{LRScheduler, StepLR};
pub use optimizer_trait::Optimizer;
pub use param_group::{ParamGroup, ParamGroupOptions};
