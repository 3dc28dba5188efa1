pub mod callbacks;
pub mod environment;
pub mod proxy;
pub mod vars;
