pub mod collect;
pub mod submit;

pub use collect::handle_collect_command;
pub use submit::handle_submit_command;
