//! Terminal front end

mod console;

pub use console::Console;
