mod algorithm;
mod export_text;
mod hyperparams;
mod iter;
pub mod random_forest;

pub use algorithm::*;
pub use export_text::*;
pub use hyperparams::*;
pub use iter::*;
