mod breadth;
mod effective;
mod mode;

pub use breadth::{Breadth, recommend_breadth, should_execute};
pub use effective::EffectivePolicy;
pub use mode::PolicyMode;
