pub mod checkpoint;
pub mod metrics;
pub mod publish;
pub mod trade;

pub use checkpoint::*;
pub use metrics::*;
pub use publish::*;
pub use trade::*;
