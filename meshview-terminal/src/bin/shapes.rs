//! Five generated primitives; number keys pick one, 0 shows them all.
use std::process::ExitCode;

use meshview_core::ProgramSpec;

fn main() -> ExitCode {
    meshview_terminal::main_for(ProgramSpec::shapes())
}
