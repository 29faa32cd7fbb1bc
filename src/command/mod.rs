mod ask;
mod tools;

pub use ask::{run_ask, AskOptions};
pub use tools::run_tools;
