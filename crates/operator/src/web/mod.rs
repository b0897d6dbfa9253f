//! HTTP surface of the operator: the conversion webhook and a health
//! probe endpoint.

mod server;

pub use server::{router, serve, ConversionReview, ConversionRequest, ConversionResponse};
