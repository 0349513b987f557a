/// Select, drag, scale and rotate state machine.
pub mod controller;
