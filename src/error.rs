//! Error type shared by every stage of a run: collecting parameters,
//! expanding sweeps, writing the analysis settings and dispatching jobs.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// No power of ten up to the precision bound turns the value into an integer.
    #[error("cannot represent {value} with at most {max_decimals} decimal places")]
    Precision { value: f64, max_decimals: u32 },

    #[error("invalid temperature sweep: min {min}, max {max}, step {step}")]
    InvalidSweep { min: f64, max: f64, step: f64 },

    /// A token that does not parse as the field it was read for.
    #[error("invalid value {value:?} for {field}")]
    InvalidField { field: &'static str, value: String },

    #[error("malformed argument string {line:?}: {reason}")]
    MalformedArguments { line: String, reason: String },

    #[error("input ended while reading {field}")]
    UnexpectedEof { field: &'static str },

    /// Analysis needs the scalars that only a simple-sampling entry provides.
    #[error("Invalid argument for directory: no simple sampling entry was given")]
    MissingDirectory,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid parameter plan: {0}")]
    Plan(#[from] toml::de::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}
