pub mod classify;
pub mod guard;
pub mod normalize;
pub mod ordering_lift;
pub mod pagination;
pub mod zero_limit;
