/// Core error type for the MyAgentView backend.
///
/// Adapter crates map their specific errors into this type so handlers can
/// tell "not permitted" outcomes (which are not errors) apart from
/// infrastructure failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
