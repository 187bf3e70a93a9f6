//! Positioning algorithms: anchor layout, the two solvers and boundary
//! correction. Everything here is pure and stateless.

pub mod analytic;
pub mod boundary;
pub mod layout;
pub mod least_squares;

pub use layout::AnchorLayout;
pub use least_squares::SolverOutcome;
