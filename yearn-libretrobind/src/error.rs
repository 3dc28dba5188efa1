use thiserror::Error;

use yearn_core::error::YearnError;
use yearn_core::portable::PStringError;

#[derive(Error, Debug)]
pub enum BindError {
    /// Library couldn't be opened or is missing a symbol
    #[error(transparent)]
    Library(#[from] libloading::Error),
    /// Path or string not representable as a C string
    #[error(transparent)]
    String(#[from] PStringError),
    #[error(transparent)]
    Yearn(#[from] YearnError),
}
