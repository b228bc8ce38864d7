#![forbid(unsafe_code)]

pub mod ldl;

pub use ldl::LdlKktSolver;
