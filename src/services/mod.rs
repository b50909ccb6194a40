pub mod bloom_filter_service;
pub mod customer_service;
pub mod job_gate;
pub mod special_offer_service;
pub mod voucher_service;

pub use bloom_filter_service::*;
pub use customer_service::*;
pub use job_gate::*;
pub use special_offer_service::*;
pub use voucher_service::*;
