use crate::nn::parameter::Parameter;

/// Defines a group of parameters with specific optimizer hyperparameters.
///
/// Parameters are shared handles: updating them through the group updates
/// the layer that owns them.
#[derive(Clone, Debug)]
pub struct ParamGroup {
    pub params: Vec<Parameter>,
    pub options: ParamGroupOptions,
}

/// Options specific to a parameter group. Unset options fall back to the
/// optimizer's defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamGroupOptions {
    pub lr: Option<f32>,
    pub betas: Option<(f32, f32)>,
    pub eps: Option<f32>,
    pub weight_decay: Option<f32>,
    pub amsgrad: Option<bool>,
}

impl ParamGroup {
    /// Creates a new parameter group with default options.
    pub fn new(params: Vec<Parameter>) -> Self {
        ParamGroup {
            params,
            options: ParamGroupOptions::default(),
        }
    }

    pub fn set_lr(&mut self, lr: f32) {
        self.options.lr = Some(lr);
    }

    pub fn lr(&self) -> Option<f32> {
        self.options.lr
    }
}
