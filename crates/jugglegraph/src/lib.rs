pub mod logging;
pub mod runner;
pub mod session;
pub mod svg;
pub mod table;
