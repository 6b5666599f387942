// Core modules implementing value mapping and error modeling.
pub mod dynamic;
pub mod error;
