//! Owns the compositor child process: spawning, stdio capture, and the
//! stdout-reading / stdin-writing glue that feeds [`compositor_wire`].

pub mod child;
pub mod stdin_writer;
pub mod stdout_reader;

pub use child::SpawnedChild;
pub use stdin_writer::write_line;
pub use stdout_reader::pump_stdout;
