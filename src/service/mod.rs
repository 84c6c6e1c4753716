//! Form service module for HTTP communication

mod client;
mod traits;

pub use client::HttpFormService;
pub use traits::{FormService, SubmitResponse};

#[cfg(test)]
pub use traits::MockFormService;
