#![forbid(unsafe_code)]

pub mod admm;
pub mod kkt;

pub use admm::AdmmSolver;
pub use kkt::KktMatrix;
