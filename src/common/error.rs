/// The error type returned when a map is built with an invalid configuration.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// The load factor must be a finite number greater than zero.
    #[error("Illegal load factor: {0}. It must be a finite number greater than zero")]
    InvalidLoadFactor(f32),
}
