//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod business_repo;
pub mod category_repo;
pub mod order_repo;
pub mod product_repo;
pub mod staff_repo;

pub use business_repo::BusinessRepo;
pub use category_repo::CategoryRepo;
pub use order_repo::OrderRepo;
pub use product_repo::ProductRepo;
pub use staff_repo::StaffRepo;
