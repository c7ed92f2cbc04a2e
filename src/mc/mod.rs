pub mod batch;
pub mod ensemble;
