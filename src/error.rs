use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(String),

    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("tick queue full for {symbol}")]
    QueueFull { symbol: String },
}
