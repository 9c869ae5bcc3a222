use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("result store endpoint is not configured")]
    Unconfigured,

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected http status {0}")]
    Status(u16),

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),
}
