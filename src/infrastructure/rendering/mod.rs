pub mod gpu_structures;

pub use gpu_structures::*;
