//! Row models and request/response DTOs.

pub mod business;
pub mod category;
pub mod order;
pub mod product;
pub mod staff;
