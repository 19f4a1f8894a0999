mod editor;
mod parser;

pub use editor::{append_host, delete_host, update_host};
pub use parser::list_hosts;
