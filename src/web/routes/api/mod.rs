mod hello;
mod submit_interest;

pub use hello::hello;
pub use submit_interest::submit_interest;
