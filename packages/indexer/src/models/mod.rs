mod delegation;

pub use delegation::{Delegation, NewDelegation};
