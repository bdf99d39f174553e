pub mod logging;
pub mod shell;
#[cfg(test)]
pub mod shell_mock;
pub mod ui;
