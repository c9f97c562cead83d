//! Chess pieces loaded from `.x` files; click to cycle through them.
use std::process::ExitCode;

use meshview_core::ProgramSpec;

fn main() -> ExitCode {
    meshview_terminal::main_for(ProgramSpec::chess())
}
