pub mod controller;
pub mod options;
pub mod pattern;
pub mod tracker;
pub mod transition;
