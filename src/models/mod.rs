pub mod customer;
pub mod special_offer;
pub mod voucher;
pub mod voucher_job;

pub use customer::*;
pub use special_offer::*;
pub use voucher::*;
pub use voucher_job::*;
