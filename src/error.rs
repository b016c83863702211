//! Error types shared by the terrain core.

/// Errors surfaced by generation, configuration loading and catalog lookups.
#[derive(thiserror::Error, Debug)]
pub enum TerrainError {
    /// An operation needed tiles from a pool that has no entries.
    #[error("no tiles configured in the {pool} pool")]
    MissingTilePool { pool: &'static str },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unknown tile `{0}`")]
    UnknownTile(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl TerrainError {
    /// True for errors caused by missing or inconsistent level setup.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            TerrainError::MissingTilePool { .. }
                | TerrainError::InvalidConfig(_)
                | TerrainError::UnknownTile(_)
        )
    }
}

pub type TerrainResult<T> = Result<T, TerrainError>;
