use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypesError {
    #[error("root {0} is not valid hex")]
    InvalidRootHex(String),
}
