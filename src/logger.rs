//! Logging utilities with colored output.
//!
//! Provides the `log!` macro for formatted terminal output with a colored
//! module prefix:
//!
//! ```ignore
//! log!("build"; "processed {} files", count);
//! // → [build] processed 42 files
//! ```

use colored::{ColoredString, Colorize};

/// Log a message with a colored module prefix.
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

pub fn log(module: &str, message: &str) {
    println!("{} {message}", prefix(module));
}

fn prefix(module: &str) -> ColoredString {
    let text = format!("[{module}]");
    match module {
        "error" => text.as_str().red().bold(),
        "warn" | "watch" => text.as_str().yellow(),
        "build" | "init" => text.as_str().green(),
        "serve" => text.as_str().blue(),
        _ => text.as_str().cyan(),
    }
}
