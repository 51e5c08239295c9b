use thiserror::Error;

use crate::network::NetworkError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("road network error: {0}")]
    Network(#[from] NetworkError),
}
