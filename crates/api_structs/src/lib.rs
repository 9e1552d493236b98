mod dispatch;
mod status;

pub mod dtos {
    pub use crate::dispatch::dtos::*;
}

pub use crate::dispatch::api::*;
pub use crate::status::api::*;
