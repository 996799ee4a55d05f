use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{}", .0)]
    Custom(String),

    #[error("IO::{:?}: {}", .0, .0)]
    Io(#[from] std::io::Error),

    #[error("{}", .0)]
    Client(#[from] magnora_core::ClientError),

    #[error("Json::{:?}: {}", .0, .0)]
    Json(#[from] serde_json::Error),
}
