//! Shared Kernel - vocabulary every crate in the workspace agrees on
//!
//! - The unified error type ([`error::app_error::AppError`]) and its HTTP mapping
//! - Typed identifiers ([`id::Id`])
//!
//! Only things whose meaning is identical across crates belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
