mod candidate;

pub use candidate::*;
