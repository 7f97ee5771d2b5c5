//! Reporters: the HTML page, its JSON sibling and the terminal summary

pub mod console;
pub mod html;
pub mod json;

pub use console::ConsoleReporter;
pub use html::HtmlReporter;
pub use json::JsonReporter;
