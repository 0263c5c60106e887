//! Emits the module registration and factory glue for this crate

fn main() {
    if let Err(e) = dib::processor::build_script::run() {
        panic!("dib processing failed: {e}");
    }
}
