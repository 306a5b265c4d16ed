//! Top-level facade crate for budgetguard.
//!
//! Re-exports the core contracts and the runtime so users can depend on a single crate.

pub mod core {
    pub use budgetguard_core::*;
}

pub mod runtime {
    pub use budgetguard_runtime::*;
}
