//! Command implementations for the three invocation modes

mod check;
mod list;
mod run;

pub use check::check;
pub use list::list;
pub use run::run;

use exectimes_core::error::SlotError;

fn output_error(err: std::io::Error) -> SlotError {
    SlotError::io("Failed to write output", err)
}
