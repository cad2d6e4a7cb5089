use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures while recording or differentiating an expression graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("loss must be a 1x1 value, got {rows}x{cols}")]
    NonScalarLoss { rows: usize, cols: usize },
    #[error("recurrence needs at least one step")]
    EmptySequence,
    #[error("label {label} out of range for {classes} classes")]
    LabelOutOfRange { label: usize, classes: usize },
    #[error("input has width {got}, expected {expected}")]
    InputWidth { expected: usize, got: usize },
    #[error("index {index} out of range for a table of {rows} rows")]
    IndexOutOfRange { index: usize, rows: usize },
    #[error("column {index} out of range for a matrix of {cols} columns")]
    ColumnOutOfRange { index: usize, cols: usize },
}

/// Invalid hyperparameters or an unreadable config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config validation: {0}")]
    Validation(String),
    #[error("reading config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrainError {
    #[error("error became non-finite ({value}) at iteration {iteration}")]
    NonFiniteError { iteration: usize, value: f64 },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Train(#[from] TrainError),
}
