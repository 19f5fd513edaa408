// src/nn/mod.rs
// Neural network building blocks: parameters, the Module trait, layers and
// initializers.

pub mod init;
pub mod layers;
pub mod module;
pub mod parameter;

pub use layers::linear::Linear;
pub use module::Module;
pub use parameter::Parameter;
