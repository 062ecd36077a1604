pub mod naming;
pub mod token;
pub mod validation;
