pub mod cpu;
pub mod passwd;
