use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("Invalid geometry type '{0}', expected MultiPolygon")]
    InvalidGeometryType(&'static str),
}
