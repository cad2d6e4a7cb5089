pub mod error_report;
pub mod loop_fn;
pub mod train_config;
pub mod trainer;

pub use error_report::{ErrorReport, TrainSummary};
pub use loop_fn::train_loop;
pub use train_config::TrainConfig;
pub use trainer::TrainStep;
