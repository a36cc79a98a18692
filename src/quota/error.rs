use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuotaError {
    #[error("bandwidth budget exhausted: requested {requested} bytes, remaining {remaining} bytes")]
    Exhausted { requested: u64, remaining: u64 },
}
