pub mod manifest;
pub mod markers;
pub mod run;
